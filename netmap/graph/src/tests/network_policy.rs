use super::*;
use netmap_core::{
    labels::{Expression, Operator},
    policy::IpBlock,
    WarningKind,
};
use pretty_assertions::assert_eq;

fn mk_frontend_backend() -> Vec<Workload> {
    vec![
        mk_workload("ns-0", "frontend", [("app", "frontend")], &[]),
        mk_workload("ns-0", "backend", [("app", "backend")], &[8080]),
    ]
}

#[test]
fn selected_peer_on_port() {
    let workloads = mk_frontend_backend();
    let policies = vec![mk_network_policy(
        "ns-0",
        "allow-frontend",
        Selector::from_iter(Some(("app", "backend"))),
        [IngressRule {
            from: vec![Peer::pods(Selector::from_iter(Some(("app", "frontend"))))],
            ports: vec![PortConstraint::number(port(8080))],
        }],
    )];
    let graph = Builder::new().build(&workloads, &policies);

    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(
        edge_pairs(&graph),
        vec![("ns-0/frontend", "ns-0/backend:TCP/8080")]
    );
    let edge = &graph.edges[0];
    assert_eq!(edge.label, "TCP:8080");
    assert_eq!(
        &*edge.rule,
        "NetworkPolicy Rule 1: from: pods: {app=frontend}, namespaces: same as policy; \
         ports: TCP/8080"
    );
    assert_eq!(&*edge.policy, "ns-0/allow-frontend");
    assert_eq!(edge_metadata(edge)["policyType"], "NetworkPolicy");
    assert_eq!(edge_metadata(edge)["ruleType"], "ingress");
    assert!(graph.warning_details.is_empty());
    assert!(graph.nodes.iter().all(|n| n.warnings().is_empty()));
}

#[test]
fn selected_peer_on_any_port() {
    let workloads = mk_frontend_backend();
    let policies = vec![mk_network_policy(
        "ns-0",
        "allow-frontend",
        Selector::from_iter(Some(("app", "backend"))),
        [IngressRule {
            from: vec![Peer::pods(Selector::from_iter(Some(("app", "frontend"))))],
            ports: vec![],
        }],
    )];
    let graph = Builder::new().build(&workloads, &policies);

    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(
        edge_pairs(&graph),
        vec![("ns-0/frontend", "ns-0/backend:TCP/8080")]
    );

    let backend = graph.node("ns-0/backend").unwrap();
    assert_eq!(
        backend.warnings().iter().collect::<Vec<_>>(),
        vec![WarningKind::UnrestrictedPorts]
    );
    assert!(graph.node("ns-0/frontend").unwrap().warnings().is_empty());
    assert_eq!(graph.warning_details.len(), 1);
    assert_eq!(graph.warning_details[0].workload_id, "ns-0/backend");
    assert_eq!(graph.warning_details[0].policy_name, "ns-0/allow-frontend");
    assert_eq!(
        graph.warning_details[0].warning_kind,
        WarningKind::UnrestrictedPorts
    );
}

#[test]
fn targets_are_confined_to_the_policy_namespace() {
    let workloads = vec![
        mk_workload("ns-0", "client", [("app", "client")], &[]),
        mk_workload("ns-0", "server", [("app", "server")], &[80]),
        mk_workload("ns-1", "server", [("app", "server")], &[80]),
    ];
    let policies = vec![mk_network_policy(
        "ns-0",
        "allow",
        Selector::from_iter(Some(("app", "server"))),
        [IngressRule {
            from: vec![Peer::pods(Selector::default())],
            ports: vec![],
        }],
    )];
    let graph = Builder::new().build(&workloads, &policies);
    assert_eq!(edge_pairs(&graph), vec![("ns-0/client", "ns-0/server:TCP/80")]);
}

#[test]
fn namespace_selectors_match_namespace_labels() {
    let workloads = vec![
        mk_workload("web", "frontend", [("app", "frontend")], &[]),
        mk_workload("web", "admin", [("app", "admin")], &[]),
        mk_workload("ops", "frontend", [("app", "frontend")], &[]),
        mk_workload("db", "postgres", [("app", "postgres")], &[5432]),
    ];
    let namespaces = vec![
        mk_namespace("web", [("team", "web")]),
        mk_namespace("db", [("team", "data")]),
    ];
    let policies = vec![mk_network_policy(
        "db",
        "allow-web",
        Selector::from_iter(Some(("app", "postgres"))),
        [IngressRule {
            from: vec![Peer::pods(Selector::from_iter(Some(("app", "frontend"))))
                .with_namespaces(Selector::from_iter(Some(("team", "web"))))],
            ports: vec![PortConstraint::number(port(5432))],
        }],
    )];
    let graph = Builder::new()
        .with_namespaces(namespaces)
        .build(&workloads, &policies);

    // ops has no namespace record, so it is unlabeled and does not match.
    assert_eq!(
        edge_pairs(&graph),
        vec![("web/frontend", "db/postgres:TCP/5432")]
    );
    assert_eq!(
        &*graph.edges[0].rule,
        "NetworkPolicy Rule 1: from: pods: {app=frontend}, namespaces: {team=web}; \
         ports: TCP/5432"
    );
}

#[test]
fn empty_namespace_selector_selects_every_namespace() {
    let workloads = vec![
        mk_workload("web", "frontend", [("app", "frontend")], &[]),
        mk_workload("ops", "monitor", [("app", "monitor")], &[]),
        mk_workload("db", "postgres", [("app", "postgres")], &[5432]),
    ];
    let policies = vec![mk_network_policy(
        "db",
        "allow-all-namespaces",
        Selector::default(),
        [IngressRule {
            from: vec![Peer::namespaces(Selector::default())],
            ports: vec![PortConstraint::number(port(5432))],
        }],
    )];
    let graph = Builder::new()
        .with_namespaces(mk_namespaces(["web", "db"]))
        .build(&workloads, &policies);

    assert_eq!(
        edge_pairs(&graph),
        vec![
            ("ops/monitor", "db/postgres:TCP/5432"),
            ("web/frontend", "db/postgres:TCP/5432"),
        ],
        "namespaces are visited in name order"
    );
    assert!(graph.warning_details.is_empty());
}

#[test]
fn namespaces_only_match_negative_expressions_without_labels() {
    let workloads = vec![
        mk_workload("web", "frontend", [("app", "frontend")], &[]),
        mk_workload("ops", "monitor", [("app", "monitor")], &[]),
        mk_workload("db", "postgres", [("app", "postgres")], &[5432]),
    ];
    let namespaces = vec![
        mk_namespace("web", [("team", "web")]),
        mk_namespace("db", [("team", "data")]),
    ];
    let policies = vec![mk_network_policy(
        "db",
        "allow-unowned",
        Selector::default(),
        [IngressRule {
            from: vec![Peer::namespaces(Selector::from_iter(Some(
                Expression::does_not_exist("team"),
            )))],
            ports: vec![],
        }],
    )];
    let graph = Builder::new()
        .with_namespaces(namespaces)
        .build(&workloads, &policies);
    assert_eq!(
        edge_pairs(&graph),
        vec![("ops/monitor", "db/postgres:TCP/5432")]
    );
}

#[test]
fn unknown_namespaces_contribute_nothing() {
    let workloads = mk_frontend_backend();
    let policies = vec![mk_network_policy(
        "ns-0",
        "allow-elsewhere",
        Selector::default(),
        [IngressRule {
            from: vec![Peer::namespaces(Selector::from_iter(Some((
                "kubernetes.io/metadata.name",
                "elsewhere",
            ))))],
            ports: vec![],
        }],
    )];
    let graph = Builder::new()
        .with_namespaces(mk_namespaces(["ns-0"]))
        .build(&workloads, &policies);
    assert!(graph.edges.is_empty());
}

#[test]
fn address_blocks_admit_policy_namespace() {
    let mut workloads = mk_frontend_backend();
    workloads.push(mk_workload("ns-1", "client", [("app", "client")], &[]));
    let policies = vec![mk_network_policy(
        "ns-0",
        "allow-cidr",
        Selector::from_iter(Some(("app", "backend"))),
        [IngressRule {
            from: vec![Peer {
                ip_block: Some(IpBlock {
                    cidr: "10.0.0.0/8".to_string(),
                    except: vec!["10.1.0.0/16".to_string()],
                }),
                ..Default::default()
            }],
            ports: vec![],
        }],
    )];
    let graph = Builder::new()
        .with_namespaces(mk_namespaces(["ns-0", "ns-1"]))
        .build(&workloads, &policies);

    assert_eq!(
        edge_pairs(&graph),
        vec![("ns-0/frontend", "ns-0/backend:TCP/8080")]
    );
    assert_eq!(
        &*graph.edges[0].rule,
        "NetworkPolicy Rule 1: from: cidr: 10.0.0.0/8; ports: all"
    );
}

#[test]
fn named_ports() {
    let workloads = vec![
        mk_workload("ns-0", "client", [("app", "client")], &[]),
        Workload::new("ns-0", "server", WorkloadKind::StatefulSet)
            .with_labels(mk_labels([("app", "server")]))
            .with_ports([
                Port::new(port(8080)).with_name("http"),
                Port::new(port(9090)).with_name("admin"),
                Port::new(port(9091)),
            ]),
    ];
    let rule = |ports: Vec<PortConstraint>| IngressRule {
        from: vec![Peer::pods(Selector::from_iter(Some(("app", "client"))))],
        ports,
    };
    let policies = vec![
        mk_network_policy(
            "ns-0",
            "http",
            Selector::default(),
            [rule(vec![PortConstraint::name("http")])],
        ),
        mk_network_policy(
            "ns-0",
            "grpc",
            Selector::default(),
            [rule(vec![PortConstraint::name("grpc")])],
        ),
        mk_network_policy(
            "ns-0",
            "numbered",
            Selector::default(),
            [rule(vec![
                PortConstraint::number(port(9091)),
                PortConstraint::name("admin"),
            ])],
        ),
    ];
    let graph = Builder::new().build(&workloads, &policies);
    assert_eq!(
        graph
            .edges
            .iter()
            .map(|e| (&*e.policy, e.target.as_str()))
            .collect::<Vec<_>>(),
        vec![
            ("ns-0/http", "ns-0/server:TCP/8080"),
            ("ns-0/numbered", "ns-0/server:TCP/9090"),
            ("ns-0/numbered", "ns-0/server:TCP/9091"),
        ]
    );
}

#[test]
fn rules_are_evaluated_in_order() {
    let workloads = vec![
        mk_workload("ns-0", "a", [("app", "a")], &[]),
        mk_workload("ns-0", "b", [("app", "b")], &[]),
        mk_workload("ns-0", "server", [("app", "server")], &[80, 443]),
    ];
    let policies = vec![mk_network_policy(
        "ns-0",
        "allow",
        Selector::from_iter(Some(("app", "server"))),
        [
            IngressRule {
                from: vec![Peer::pods(Selector::from_iter(Some(("app", "b"))))],
                ports: vec![PortConstraint::number(port(443))],
            },
            IngressRule {
                from: vec![Peer::pods(Selector::from_iter(Some(Expression::new(
                    "app",
                    Operator::In,
                    ["a", "b"],
                ))))],
                ports: vec![PortConstraint::number(port(80))],
            },
        ],
    )];
    let graph = Builder::new().build(&workloads, &policies);
    assert_eq!(
        graph
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), &*e.rule))
            .collect::<Vec<_>>(),
        vec![
            (
                "ns-0/b",
                "ns-0/server:TCP/443",
                "NetworkPolicy Rule 1: from: pods: {app=b}, namespaces: same as policy; \
                 ports: TCP/443"
            ),
            (
                "ns-0/a",
                "ns-0/server:TCP/80",
                "NetworkPolicy Rule 2: from: pods: {app in (a,b)}, namespaces: same as policy; \
                 ports: TCP/80"
            ),
            (
                "ns-0/b",
                "ns-0/server:TCP/80",
                "NetworkPolicy Rule 2: from: pods: {app in (a,b)}, namespaces: same as policy; \
                 ports: TCP/80"
            ),
        ]
    );
}

#[test]
fn overlapping_peers_do_not_duplicate_edges() {
    let workloads = mk_frontend_backend();
    let policies = vec![mk_network_policy(
        "ns-0",
        "allow",
        Selector::from_iter(Some(("app", "backend"))),
        [IngressRule {
            from: vec![
                Peer::pods(Selector::from_iter(Some(("app", "frontend")))),
                Peer::pods(Selector::default()),
            ],
            ports: vec![],
        }],
    )];
    let graph = Builder::new().build(&workloads, &policies);
    assert_eq!(
        edge_pairs(&graph),
        vec![("ns-0/frontend", "ns-0/backend:TCP/8080")]
    );
}
