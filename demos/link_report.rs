//! Print the struct links of a METS document and the divisions they miss.
//!
//! Usage: cargo run --example link_report -- mets.xml

use std::env;
use std::process;

use mets_validator::document::{STRUCT_MAP_LOGICAL, STRUCT_MAP_PHYSICAL, XMLNS_METS};
use mets_validator::parse_file;
use mets_validator::xref::{division_ids, extract_links, find_struct_map, has_indirect_coverage};

fn main() {
    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: link_report <METS_FILE>");
            process::exit(1);
        }
    };

    let doc = match parse_file(&path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            process::exit(1);
        }
    };
    let mets = doc.root();

    let Some(struct_link) = mets.child(XMLNS_METS, "structLink") else {
        println!("{}: no structLink section", path);
        return;
    };

    let mut problems = Vec::new();
    let links = extract_links(struct_link, &mut problems);
    for p in &problems {
        eprintln!("warning: {}", p);
    }

    println!("{} links", links.len());
    for from in links.sources() {
        let targets: Vec<_> = links.targets_of(from).collect();
        println!("  {} -> {}", from, targets.join(", "));
    }

    if let Some(logical) = find_struct_map(mets, STRUCT_MAP_LOGICAL) {
        for id in division_ids(logical) {
            if links.is_source(id) {
                continue;
            }
            if has_indirect_coverage(mets, id, &links) {
                println!("  {} (covered by a descendant)", id);
            } else {
                println!("  {} (not linked)", id);
            }
        }
    }

    let pages = find_struct_map(mets, STRUCT_MAP_PHYSICAL)
        .and_then(|sm| sm.child(XMLNS_METS, "div"))
        .map(division_ids)
        .unwrap_or_default();
    let unlinked = pages.iter().filter(|id| !links.is_target(id)).count();
    println!("{} of {} pages linked", pages.len() - unlinked, pages.len());
}
