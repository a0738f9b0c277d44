//! Field paths: deep access, mutation, and the path algebra.
//!
//! Run with: cargo run --example paths

use jsondoc::{from_str, FieldPath, Result};

fn main() -> Result<()> {
    let mut doc = from_str(
        r#"{
        "order": {
            "items": [
                {"sku": "A-100", "price": {"$decimal": "9.99"}},
                {"sku": "B-200", "price": {"$decimal": "14.50"}}
            ],
            "note": "rush"
        }
    }"#,
    )?;

    // Dotted paths with indexes reach anywhere in the tree.
    println!("first sku: {:?}", doc.get_string("order.items[0].sku")?);
    println!("second price: {:?}", doc.get_decimal("order.items[1].price")?);

    // set creates intermediate containers on demand.
    doc.set("order.items[2].sku", "C-300")?;
    doc.set("order.shipping.method", "express")?;
    doc.delete("order.note")?;
    println!("after edits: {}", doc.to_json_string()?);

    // Odd field names are quoted with backticks.
    doc.set("`strange.name`", 1)?;
    println!("quoted lookup: {:?}", doc.get_int("`strange.name`")?);

    // The path algebra answers ancestry questions without touching data.
    let items = FieldPath::parse("order.items")?;
    let price = FieldPath::parse("order.items[1].price")?;
    println!("{} is above {}: {}", items, price, items.is_at_or_above(&price));
    println!("{} contains {}: {}", items, price, items.contains(&price));

    // Paths are case-insensitive as values, even though document lookup
    // is exact-match.
    assert_eq!(FieldPath::parse("Order.Items")?, FieldPath::parse("order.items")?);

    Ok(())
}
