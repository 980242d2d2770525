//! Applicant Form - manual input, validated
//!
//! Field set and defaults of the sidebar form. Categorical options are closed
//! lists; their wire form is the label used in the reference data.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::logic::dataset::columns;
use crate::logic::features::{ClientRecord, FeatureValue};

// ============================================================================
// CATEGORICAL OPTIONS
// ============================================================================

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|c| c.label() == label)
            }
        }

        /// First option of the list
        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let label = String::deserialize(deserializer)?;
                Self::from_label(&label).ok_or_else(|| {
                    D::Error::custom(format!("unknown {} option '{}'", stringify!($name), label))
                })
            }
        }
    };
}

choice_enum!(Education {
    Higher => "Higher education",
    Secondary => "Secondary / secondary special",
    IncompleteHigher => "Incomplete higher",
    LowerSecondary => "Lower secondary",
});

choice_enum!(IncomeType {
    Working => "Working",
    CommercialAssociate => "Commercial associate",
    Pensioner => "Pensioner",
    StateServant => "State servant",
    Unemployed => "Unemployed",
});

choice_enum!(FamilyStatus {
    Married => "Married",
    Single => "Single / not married",
    CivilMarriage => "Civil marriage",
    Widow => "Widow",
});

choice_enum!(HousingType {
    HouseApartment => "House / apartment",
    Municipal => "Municipal apartment",
    Rented => "Rented apartment",
    Office => "Office apartment",
    WithParents => "With parents",
});

// ============================================================================
// FORM
// ============================================================================

/// Omitted fields take their default when deserialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ApplicantForm {
    /// 0 = female, 1 = male
    #[validate(range(max = 1))]
    pub gender: u8,
    #[validate(range(max = 1))]
    pub owns_car: u8,
    #[validate(range(max = 1))]
    pub owns_realty: u8,
    #[validate(range(min = 0))]
    pub income_total: i64,
    #[validate(range(min = 0))]
    pub credit_amount: i64,
    pub education: Education,
    pub income_type: IncomeType,
    pub family_status: FamilyStatus,
    pub housing_type: HousingType,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ext_source_2: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ext_source_3: f64,
}

impl Default for ApplicantForm {
    fn default() -> Self {
        Self {
            gender: 0,
            owns_car: 0,
            owns_realty: 0,
            income_total: 50_000,
            credit_amount: 200_000,
            education: Education::default(),
            income_type: IncomeType::default(),
            family_status: FamilyStatus::default(),
            housing_type: HousingType::default(),
            ext_source_2: 0.5,
            ext_source_3: 0.5,
        }
    }
}

impl ApplicantForm {
    /// Range rules plus finiteness of the score sliders
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };
        for (field, value) in [("ext_source_2", self.ext_source_2), ("ext_source_3", self.ext_source_3)] {
            if !value.is_finite() {
                errors.add(field, ValidationError::new("finite"));
            }
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn gender_label(&self) -> &'static str {
        if self.gender == 0 {
            "Femme"
        } else {
            "Homme"
        }
    }

    /// The 11 `APP_*` fields sent for scoring
    pub fn to_record(&self) -> ClientRecord {
        ClientRecord::new()
            .with(columns::GENDER, self.gender as i64)
            .with(columns::OWN_CAR, self.owns_car as i64)
            .with(columns::OWN_REALTY, self.owns_realty as i64)
            .with(columns::INCOME_TOTAL, self.income_total)
            .with(columns::CREDIT, self.credit_amount)
            .with(columns::EDUCATION_TYPE, self.education.label())
            .with(columns::INCOME_TYPE, self.income_type.label())
            .with(columns::FAMILY_STATUS, self.family_status.label())
            .with(columns::HOUSING_TYPE, self.housing_type.label())
            .with(columns::EXT_SOURCE_2, self.ext_source_2)
            .with(columns::EXT_SOURCE_3, self.ext_source_3)
    }

    /// Copy of the form with one field replaced, `value` given as JSON or
    /// as a bare option label (`education=Higher education`)
    pub fn with_field(&self, field: &str, value: &str) -> Result<Self, String> {
        let mut fields = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(fields)) => fields,
            Ok(_) => return Err("form does not serialize to an object".to_string()),
            Err(e) => return Err(e.to_string()),
        };
        if !fields.contains_key(field) {
            let known: Vec<&String> = fields.keys().collect();
            return Err(format!("unknown form field '{}' (fields: {:?})", field, known));
        }

        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        fields.insert(field.to_string(), value);

        serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| format!("invalid value for '{}': {}", field, e))
    }

    /// Form prefilled from a reference row. Missing or out-of-range cells
    /// keep the default.
    pub fn prefill_from(row: &ClientRecord) -> Self {
        let mut form = Self::default();

        let flag = |name: &str| {
            row.get(name)
                .and_then(FeatureValue::as_finite)
                .filter(|v| *v == 0.0 || *v == 1.0)
                .map(|v| v as u8)
        };
        let amount = |name: &str| {
            row.get(name)
                .and_then(FeatureValue::as_finite)
                .filter(|v| *v >= 0.0)
                .map(|v| v.trunc() as i64)
        };
        let unit = |name: &str| {
            row.get(name)
                .and_then(FeatureValue::as_finite)
                .filter(|v| (0.0..=1.0).contains(v))
        };
        let text = |name: &str| row.get(name).and_then(FeatureValue::as_str);

        if let Some(v) = flag(columns::GENDER) {
            form.gender = v;
        }
        if let Some(v) = flag(columns::OWN_CAR) {
            form.owns_car = v;
        }
        if let Some(v) = flag(columns::OWN_REALTY) {
            form.owns_realty = v;
        }
        if let Some(v) = amount(columns::INCOME_TOTAL) {
            form.income_total = v;
        }
        if let Some(v) = amount(columns::CREDIT) {
            form.credit_amount = v;
        }
        if let Some(v) = text(columns::EDUCATION_TYPE).and_then(Education::from_label) {
            form.education = v;
        }
        if let Some(v) = text(columns::INCOME_TYPE).and_then(IncomeType::from_label) {
            form.income_type = v;
        }
        if let Some(v) = text(columns::FAMILY_STATUS).and_then(FamilyStatus::from_label) {
            form.family_status = v;
        }
        if let Some(v) = text(columns::HOUSING_TYPE).and_then(HousingType::from_label) {
            form.housing_type = v;
        }
        if let Some(v) = unit(columns::EXT_SOURCE_2) {
            form.ext_source_2 = v;
        }
        if let Some(v) = unit(columns::EXT_SOURCE_3) {
            form.ext_source_3 = v;
        }

        form
    }
}
