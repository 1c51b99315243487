use post_migration_rs::common;
use std::env::args;
use std::path::PathBuf;

fn main() {
    let path = args()
        .nth(1)
        .expect("Please provide a markdown file path")
        .parse::<PathBuf>()
        .expect("Failed to parse markdown file path");

    let content = common::read_file_content(&path).expect("Could not read content");

    let events = common::parse_markdown_file(&content);

    /*
       Event Start(Heading { level: H2, id: None, classes: [], attrs: [] })
       Event Text(Borrowed("Using "))
       Event Code(Borrowed("serde"))
       Event Text(Borrowed(" with enums"))
       Event End(Heading(H2))
    */
    for event in &events {
        println!("Event {event:?}");
    }

    println!();
    println!("Title: {:?}", common::extract_first_heading_text(&events));
}
