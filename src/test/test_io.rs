use crate::bgp::Relation::*;
use crate::io::{
    read_announcements, read_relationships, read_rov_asns, render_as_path, write_ribs,
    Announcement,
};
use crate::simulator::Simulator;
use crate::Asn;
use maplit::hashset;
use std::collections::HashSet;

#[test]
fn test_read_relationships() {
    let input = "\
# comment line
1|2|-1
2|3|0|bgp

3|4|2
5|6|-1|mlp|extra
junk|7|-1
8|9|one
";
    let graph = read_relationships(input.as_bytes()).unwrap();

    // unknown code 2 and the malformed lines are skipped
    assert_eq!(graph.num_asns(), 5);
    let n2: HashSet<_> = graph.neighbors(Asn(2)).collect();
    assert_eq!(
        n2,
        hashset! {(Asn(1), CustomerToProvider), (Asn(3), PeerToPeer)}
    );
    let n5: HashSet<_> = graph.neighbors(Asn(5)).collect();
    assert_eq!(n5, hashset! {(Asn(6), ProviderToCustomer)});
    assert_eq!(graph.neighbors(Asn(4)).count(), 0);
    assert_eq!(graph.neighbors(Asn(7)).count(), 0);
}

#[test]
fn test_read_announcements() {
    let input = "\
asn,prefix,rov_invalid
1,10.0.0.0/24,False
 2 , 20.0.0.0/24 , True
3,30.0.0.0/24,true
4,40.0.0.0/24,1
5,50.0.0.0/24,0
nope,60.0.0.0/24,False
7,70.0.0.0/24
";
    let anns = read_announcements(input.as_bytes());
    assert_eq!(
        anns,
        vec![
            Announcement {
                origin: Asn(1),
                prefix: "10.0.0.0/24".into(),
                rov_invalid: false
            },
            Announcement {
                origin: Asn(2),
                prefix: "20.0.0.0/24".into(),
                rov_invalid: true
            },
            Announcement {
                origin: Asn(3),
                prefix: "30.0.0.0/24".into(),
                rov_invalid: true
            },
            Announcement {
                origin: Asn(4),
                prefix: "40.0.0.0/24".into(),
                rov_invalid: true
            },
            Announcement {
                origin: Asn(5),
                prefix: "50.0.0.0/24".into(),
                rov_invalid: false
            },
        ]
    );
}

#[test]
fn test_rov_flag_is_substring_matched() {
    // the flag is a substring check, not a boolean parse
    let input = "asn,prefix,rov_invalid\n1,p,10\n2,p,TRUE\n";
    let anns = read_announcements(input.as_bytes());
    assert!(anns[0].rov_invalid); // "10" contains "1"
    assert!(!anns[1].rov_invalid); // "TRUE" matches neither "True" nor "true"
}

#[test]
fn test_read_rov_asns() {
    let input = "\
# rov deployers
64500

abc
64501
";
    let asns = read_rov_asns(input.as_bytes()).unwrap();
    assert_eq!(asns, hashset! {Asn(64500), Asn(64501)});
}

#[test]
fn test_render_as_path() {
    assert_eq!(render_as_path(&[Asn(1)]), "(1,)");
    assert_eq!(render_as_path(&[Asn(3), Asn(2), Asn(1)]), "(3, 2, 1)");
}

#[test]
fn test_export_format() {
    // full pipeline over the text interfaces
    let graph = read_relationships("1|2|-1\n1|3|-1\n".as_bytes()).unwrap();
    let mut sim = Simulator::new(graph);
    for ann in read_announcements("asn,prefix,rov_invalid\n1,10.0.0.0/24,False\n".as_bytes()) {
        sim.seed_announcement(ann.origin, ann.prefix, ann.rov_invalid);
    }
    sim.propagate().unwrap();

    let mut out = Vec::new();
    write_ribs(&sim, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "asn,prefix,as_path\n\
         1,10.0.0.0/24,\"(1,)\"\n\
         2,10.0.0.0/24,\"(2, 1)\"\n\
         3,10.0.0.0/24,\"(3, 1)\"\n"
    );
}

#[test]
fn test_export_sorts_asns_numerically() {
    // AS 2 sorts before AS 10, even though "10" < "2" as a string
    let graph = read_relationships("2|10|-1\n".as_bytes()).unwrap();
    let mut sim = Simulator::new(graph);
    sim.seed_announcement(Asn(10), "p".into(), false);
    sim.propagate().unwrap();

    let mut out = Vec::new();
    write_ribs(&sim, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "asn,prefix,as_path\n\
         2,p,\"(2, 10)\"\n\
         10,p,\"(10,)\"\n"
    );
}
