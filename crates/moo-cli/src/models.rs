//! Built-in demo models.
//!
//! Small nutrition and body-condition formulas, enough to exercise argument
//! binding against nested cow files.

use moo_core::{Record, Value};
use moo_registry::{Model, ModelCatalog, ModelSignature};

/// Every built-in model.
pub fn catalog() -> ModelCatalog {
    [model1(), model2(), model3()].into_iter().collect()
}

/// Age-adjusted body mass index.
pub fn model1() -> Model {
    let signature = ModelSignature::new("model1").param("weight").param("height").param("age");
    Model::new(signature, |args| {
        let height = args.f64("height")?;
        anyhow::ensure!(height > 0.0, "height must be positive, got {height}");
        let bmi = args.f64("weight")? / height.powi(2);
        Ok(Value::Float(bmi * args.f64("age")?))
    })
}

/// Basal metabolic rate, total daily energy expenditure and caloric balance.
pub fn model2() -> Model {
    let signature = ModelSignature::new("model2")
        .param("energy_intake")
        .param("activity_level")
        .param("weight")
        .param("height");
    Model::new(signature, |args| {
        let bmr = 10.0 * args.f64("weight")? + 6.25 * args.f64("height")? - 150.0;
        let tdee = bmr * args.f64("activity_level")?;
        let balance = args.f64("energy_intake")? - tdee;
        Ok(Value::List(vec![bmr.into(), tdee.into(), balance.into()]))
    })
}

/// Calories from macronutrients, total and per kilogram of body weight.
pub fn model3() -> Model {
    let signature = ModelSignature::new("model3")
        .param("protein_intake")
        .param("carb_intake")
        .param("fat_intake")
        .param("weight");
    Model::new(signature, |args| {
        let total = args.f64("protein_intake")? * 4.0
            + args.f64("carb_intake")? * 4.0
            + args.f64("fat_intake")? * 9.0;
        let weight = args.f64("weight")?;
        anyhow::ensure!(weight > 0.0, "weight must be positive, got {weight}");

        let mut out = Record::with_capacity(2);
        out.insert("total_calories", total);
        out.insert("calories_per_kg", total / weight);
        Ok(Value::Map(out))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kwargs(pairs: &[(&str, f64)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_catalog_contains_all_models() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        for name in ["model1", "model2", "model3"] {
            assert!(catalog.get(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_model1() {
        let result = model1()
            .call(&kwargs(&[("weight", 500.0), ("height", 2.0), ("age", 3.0)]))
            .unwrap();
        assert_eq!(result, Value::Float(375.0));
    }

    #[test]
    fn test_model1_rejects_zero_height() {
        let err = model1()
            .call(&kwargs(&[("weight", 500.0), ("height", 0.0), ("age", 3.0)]))
            .unwrap_err();
        assert!(err.to_string().contains("height must be positive"));
    }

    #[test]
    fn test_model2() {
        let result = model2()
            .call(&kwargs(&[
                ("energy_intake", 10_000.0),
                ("activity_level", 2.0),
                ("weight", 500.0),
                ("height", 16.0),
            ]))
            .unwrap();
        assert_eq!(
            result,
            Value::List(vec![Value::Float(4950.0), Value::Float(9900.0), Value::Float(100.0)])
        );
    }

    #[test]
    fn test_model3() {
        let result = model3()
            .call(&kwargs(&[
                ("protein_intake", 100.0),
                ("carb_intake", 200.0),
                ("fat_intake", 50.0),
                ("weight", 1650.0),
            ]))
            .unwrap();
        let out = result.as_record().unwrap();
        assert_eq!(out.get("total_calories"), Some(&Value::Float(1650.0)));
        assert_eq!(out.get("calories_per_kg"), Some(&Value::Float(1.0)));
    }
}
