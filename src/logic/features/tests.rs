//! Normalization & sanitization tests
//!
//! Kiểm tra normalize/sanitize trên các record thực tế từ form.

#[cfg(test)]
mod normalize_tests {
    use crate::logic::features::{
        normalize, sanitize, ClientRecord, FeatureContract, FeatureValue,
    };

    /// Record produced by the manual-entry form
    fn form_record() -> ClientRecord {
        ClientRecord::new()
            .with("APP_CODE_GENDER", 0)
            .with("APP_FLAG_OWN_CAR", 1)
            .with("APP_FLAG_OWN_REALTY", 0)
            .with("APP_AMT_INCOME_TOTAL", 50000)
            .with("APP_AMT_CREDIT", 200000)
            .with("APP_EXT_SOURCE_2", 0.5)
            .with("APP_EXT_SOURCE_3", 0.5)
            .with("APP_NAME_EDUCATION_TYPE", "Higher education")
            .with("APP_NAME_INCOME_TYPE", "Working")
            .with("APP_NAME_FAMILY_STATUS", "Married")
            .with("APP_HOUSETYPE_MODE", "House / apartment")
    }

    fn form_contract_with_extra() -> FeatureContract {
        FeatureContract::new([
            "APP_EXT_SOURCE_3",
            "APP_CODE_GENDER",
            "APP_FLAG_OWN_CAR",
            "APP_FLAG_OWN_REALTY",
            "APP_AMT_INCOME_TOTAL",
            "APP_AMT_CREDIT",
            "FOO",
            "APP_EXT_SOURCE_2",
            "APP_NAME_EDUCATION_TYPE",
            "APP_NAME_INCOME_TYPE",
            "APP_NAME_FAMILY_STATUS",
            "APP_HOUSETYPE_MODE",
        ])
        .unwrap()
    }

    #[test]
    fn test_form_record_with_extra_contract_feature() {
        let record = form_record();
        let contract = form_contract_with_extra();
        let normalized = normalize(&record, &contract);

        assert_eq!(normalized.len(), contract.len());
        assert_eq!(normalized.get("FOO"), Some(&FeatureValue::Int(0)));

        // No listed key dropped, values copied unchanged
        for (name, value) in record.iter() {
            assert_eq!(normalized.get(name), Some(value), "{} should be copied", name);
        }
    }

    #[test]
    fn test_output_follows_contract_order() {
        let contract = form_contract_with_extra();
        let normalized = normalize(&form_record(), &contract);

        let names: Vec<&str> = normalized.iter().map(|(n, _)| n).collect();
        let expected: Vec<&str> = contract.names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_extra_fields_dropped() {
        let contract = FeatureContract::new(["APP_AMT_CREDIT"]).unwrap();
        let record = ClientRecord::new()
            .with("APP_AMT_CREDIT", 1000)
            .with("DISPLAY_ONLY", "note")
            .with("SK_ID_CURR", 100002);

        let normalized = normalize(&record, &contract);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("DISPLAY_ONLY"), None);
        assert_eq!(normalized.values(), &[FeatureValue::Int(1000)]);
    }

    #[test]
    fn test_empty_record_is_all_zero() {
        let contract = FeatureContract::new(["A", "B", "C"]).unwrap();
        let normalized = normalize(&ClientRecord::new(), &contract);
        assert!(normalized.values().iter().all(|v| *v == FeatureValue::Int(0)));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let contract = form_contract_with_extra();
        let a = normalize(&form_record(), &contract);
        let b = normalize(&form_record(), &contract);
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_values_are_copied_not_filled() {
        // Present-but-missing is still "present": sanitize handles it later
        let contract = FeatureContract::new(["APP_EXT_SOURCE_3"]).unwrap();
        let record = ClientRecord::new().with("APP_EXT_SOURCE_3", f64::NAN);
        let normalized = normalize(&record, &contract);
        assert!(normalized.values()[0].is_missing());
    }

    #[test]
    fn test_serialized_key_order() {
        let contract = FeatureContract::new(["Z_LAST", "A_FIRST", "M_MIDDLE"]).unwrap();
        let record = ClientRecord::new().with("A_FIRST", 1).with("M_MIDDLE", 0.5);
        let json = serde_json::to_string(&normalize(&record, &contract)).unwrap();
        assert_eq!(json, r#"{"Z_LAST":0,"A_FIRST":1,"M_MIDDLE":0.5}"#);
    }

    #[test]
    fn test_layout_validation() {
        let contract = form_contract_with_extra();
        let other = FeatureContract::new(["APP_AMT_CREDIT"]).unwrap();
        let normalized = normalize(&form_record(), &contract);

        assert!(normalized.validate(&contract).is_ok());
        assert!(normalized.validate(&other).is_err());
    }

    #[test]
    fn test_sanitize_replaces_non_finite() {
        let record = ClientRecord::new()
            .with("nan", f64::NAN)
            .with("inf", f64::INFINITY)
            .with("neg_inf", f64::NEG_INFINITY)
            .with("ok_float", 0.12)
            .with("ok_int", 7)
            .with("text", "Working");

        let clean = sanitize(&record);
        assert_eq!(clean.get("nan"), Some(&FeatureValue::Int(0)));
        assert_eq!(clean.get("inf"), Some(&FeatureValue::Int(0)));
        assert_eq!(clean.get("neg_inf"), Some(&FeatureValue::Int(0)));
        assert_eq!(clean.get("ok_float"), Some(&FeatureValue::Float(0.12)));
        assert_eq!(clean.get("ok_int"), Some(&FeatureValue::Int(7)));
        assert_eq!(clean.get("text"), Some(&FeatureValue::Text("Working".into())));
    }

    #[test]
    fn test_sanitize_idempotent() {
        let record = ClientRecord::new()
            .with("a", f64::NAN)
            .with("b", -0.0)
            .with("c", f64::MAX)
            .with("d", "x");

        let once = sanitize(&record);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_normalized_record_keeps_layout() {
        let contract = FeatureContract::new(["A", "B"]).unwrap();
        let record = ClientRecord::new().with("A", f64::INFINITY).with("B", 2.5);
        let normalized = normalize(&record, &contract);
        let clean = sanitize(&normalized);

        assert_eq!(clean.layout_hash(), normalized.layout_hash());
        assert_eq!(clean.values(), &[FeatureValue::Int(0), FeatureValue::Float(2.5)]);
        assert_eq!(sanitize(&clean), clean);
    }
}
