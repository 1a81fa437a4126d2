use record_transform::transform::group_fold::{
    Combine, group_by_array, group_by_count, group_by_named, group_fold, group_map_to_value,
};
use record_transform::{Accessor, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();

    let sales = vec![
        Value::map([("category", Value::from("A")), ("value", Value::Int(120))]),
        Value::map([("category", Value::from("B")), ("value", Value::Int(40))]),
        Value::map([("category", Value::from("A")), ("value", Value::Int(75))]),
        Value::map([("category", Value::from("C")), ("value", Value::Int(310))]),
        Value::map([("category", Value::from("B")), ("value", Value::Int(12))]),
    ];
    let category = Accessor::new("category");

    // Group by category and compute average of 'value'
    let sums = group_fold(&sales, &category, |acc: Option<(i64, i64)>, record, _| {
        let value = record.get("value").and_then(Value::as_i64).unwrap_or(0);
        let (sum, n) = acc.unwrap_or((0, 0));
        (sum + value, n + 1)
    })?;
    for (k, (sum, n)) in &sums {
        println!("Category {} => {:.2}", k, *sum as f64 / *n as f64);
    }

    let counts = group_by_count(&sales, &category)?;
    println!("Counts: {:?}", group_map_to_value(counts));

    for (k, rows) in group_by_array(&sales, &category)? {
        println!("Category {} => {} rows", k, rows.len());
    }

    // Combiner chosen at runtime
    let combine: Combine = std::env::args().nth(1).as_deref().unwrap_or("last").parse()?;
    let named = group_by_named(&sales, &category, combine)?;
    println!("{:?}: {:?}", combine, group_map_to_value(named));

    Ok(())
}
