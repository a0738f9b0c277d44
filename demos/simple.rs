//! First steps: build a document, write it as tagged JSON, read it back.
//!
//! Run with: cargo run --example simple

use jsondoc::{from_str, Date, Document, JsonOptions, Result, Value};

fn main() -> Result<()> {
    let mut doc = Document::new();
    doc.set_id("user0001");
    doc.set("name", "Alice")?;
    doc.set("joined", Date::parse("2024-03-15")?)?;
    doc.set("visits", Value::Long(42))?;
    doc.set("address.city", "Oslo")?;
    doc.set("scores[0]", 10)?;
    doc.set("scores[1]", 20)?;

    println!("compact: {}", doc.to_json_string()?);
    println!(
        "pretty:\n{}",
        doc.to_json_string_with_options(&JsonOptions::pretty())?
    );

    // The tagged text reads back with the exact kinds intact.
    let back = from_str(&doc.to_json_string()?)?;
    assert_eq!(back, doc);
    println!("joined as date: {:?}", back.get_date("joined")?);
    println!("visits as long: {:?}", back.get_long("visits")?);

    // Without tags the output is plain JSON, at the cost of fidelity.
    let plain = doc.to_json_string_with_options(&JsonOptions::new().with_tags(false))?;
    println!("untagged: {}", plain);

    Ok(())
}
