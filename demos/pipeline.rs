use record_transform::{Accessor, MethodRecord, Pipeline, Predicate, Value};
use record_transform::transform::AccessorFailure;

#[derive(Debug)]
struct Order {
    id: i64,
    region: &'static str,
    tags: Vec<&'static str>,
    value: i64,
}

impl MethodRecord for Order {
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, AccessorFailure> {
        match (name, args) {
            ("id", []) => Ok(Value::Int(self.id)),
            ("region", []) => Ok(Value::from(self.region)),
            ("tags", []) => Ok(Value::from(self.tags.clone())),
            ("above", [Value::Int(limit)]) => Ok(Value::Bool(self.value > *limit)),
            _ => Err(format!("unknown accessor `{}`", name).into()),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();

    let orders: Vec<Value> = [
        (1, "EU", vec!["gift", "express"], 250),
        (2, "US", vec!["express"], 40),
        (3, "EU", vec![], 900),
        (4, "ASIA", vec!["gift"], 130),
        (5, "US", vec!["bulk", "gift"], 510),
    ]
    .into_iter()
    .map(|(id, region, tags, value)| Value::object(Order { id, region, tags, value }))
    .collect();

    // Tags of large orders
    let tags = Pipeline::new(&orders)
        .filter_by(Accessor::with_args("above", vec![Value::Int(100)]), Predicate::Default)
        .map_by("tags")
        .flatten()
        .filter_values(Predicate::Default)
        .execute()?;
    println!("Tags on orders above 100: {:?}", tags);

    // Large orders per region
    let per_region = Pipeline::new(&orders)
        .filter_by(Accessor::with_args("above", vec![Value::Int(100)]), Predicate::Default)
        .group_by_count("region")?;
    for (region, n) in per_region {
        println!("Region {} => {} large orders", region, n);
    }

    // First two regions in input order
    let regions = Pipeline::new(&orders)
        .unique_by("region")
        .map_by("region")
        .limit(2)
        .execute()?;
    println!("First regions: {:?}", regions);

    Ok(())
}
