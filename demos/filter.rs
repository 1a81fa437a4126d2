use record_transform::transform::collection_transformer::{filter_by, filter_hash, filter_values};
use record_transform::{Accessor, Predicate, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();

    let orders: Vec<Value> = [(1, "EU", 250), (2, "US", 40), (3, "ASIA", 0), (4, "EU", 120)]
        .into_iter()
        .map(|(id, region, value)| {
            Value::map([
                ("id", Value::Int(id)),
                ("region", Value::from(region)),
                ("value", Value::Int(value)),
            ])
        })
        .collect();

    // Rows where 'value' > 100
    let large = filter_by(
        &orders,
        &Accessor::new("value"),
        &Predicate::from_fn(|v| v.as_i64().is_some_and(|n| n > 100)),
    )?;
    println!("Rows where 'value' > 100: {:?}", large);

    // Rows in a region matching a pattern
    let a_regions = filter_by(&orders, &Accessor::new("region"), &Predicate::pattern("^A")?)?;
    println!("Rows in regions starting with 'A': {:?}", a_regions);

    // Rows whose 'value' is truthy
    let non_zero = filter_by(&orders, &Accessor::new("value"), &Predicate::Default)?;
    println!("Rows with a non-zero value: {}", non_zero.len());

    // Plain values
    let mixed = vec![Value::Int(0), Value::from("x"), Value::Undef, Value::Int(5)];
    println!("Truthy values: {:?}", filter_values(&mixed, &Predicate::Default)?);

    // Map entries by key
    if let Value::Map(entries) = &orders[0] {
        let picked = filter_hash(entries, &Predicate::from_entry_fn(|key, _| key != "region"))?;
        println!("Entries without 'region': {:?}", picked);
    }

    // Regions listed in a key set
    let listed = filter_by(&orders, &Accessor::new("region"), &Predicate::key_in(["EU", "US"]))?;
    println!("Rows in EU or US: {}", listed.len());

    Ok(())
}
