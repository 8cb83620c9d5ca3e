use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Business {
    pub id: i64,
    pub inn: i64,
    pub ogrn: Option<i64>,
    pub owner: String,
    pub short_name: String,
    pub full_name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub inn: i64,
    pub ogrn: Option<i64>,
    pub owner: String,
    pub short_name: String,
    pub full_name: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BusinessPatch {
    pub inn: Option<i64>,
    pub ogrn: Option<i64>,
    pub owner: Option<String>,
    pub short_name: Option<String>,
    pub full_name: Option<String>,
    pub address: Option<String>,
}

impl BusinessPatch {
    pub fn is_empty(&self) -> bool {
        self.inn.is_none()
            && self.ogrn.is_none()
            && self.owner.is_none()
            && self.short_name.is_none()
            && self.full_name.is_none()
            && self.address.is_none()
    }

    pub fn apply_to(&self, business: &mut Business) {
        if let Some(inn) = self.inn {
            business.inn = inn;
        }
        if let Some(ogrn) = self.ogrn {
            business.ogrn = Some(ogrn);
        }
        if let Some(owner) = &self.owner {
            business.owner = owner.clone();
        }
        if let Some(short_name) = &self.short_name {
            business.short_name = short_name.clone();
        }
        if let Some(full_name) = &self.full_name {
            business.full_name = full_name.clone();
        }
        if let Some(address) = &self.address {
            business.address = Some(address.clone());
        }
    }
}

/// Russian taxpayer numbers: 10 digits for organisations, 12 for individuals.
pub fn is_valid_inn(inn: &str) -> bool {
    matches!(inn.len(), 10 | 12) && inn.bytes().all(|b| b.is_ascii_digit())
}

/// Stored INNs are integers, so leading zeros are gone; anything positive with at
/// most 12 digits is a possible INN.
pub fn is_valid_inn_number(inn: i64) -> bool {
    (1..=999_999_999_999).contains(&inn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inn_accepts_organisation_and_individual_lengths() {
        assert!(is_valid_inn("7707083893"));
        assert!(is_valid_inn("500100732259"));
        assert!(!is_valid_inn("77070838"));
        assert!(!is_valid_inn("77070838ab"));
    }

    #[test]
    fn numeric_inn_keeps_regions_with_leading_zero() {
        assert!(is_valid_inn_number(274_062_111));
        assert!(is_valid_inn_number(500_100_732_259));
        assert!(!is_valid_inn_number(0));
        assert!(!is_valid_inn_number(-7_707_083_893));
        assert!(!is_valid_inn_number(1_000_000_000_000));
    }

    #[test]
    fn patch_only_touches_provided_fields() {
        let now = Utc::now();
        let mut business = Business {
            id: 1,
            inn: 7707083893,
            ogrn: None,
            owner: "Ivanov".into(),
            short_name: "Shop".into(),
            full_name: "Shop LLC".into(),
            address: None,
            created_at: now,
            updated_at: now,
        };
        let patch = BusinessPatch {
            short_name: Some("Market".into()),
            address: Some("Ryazan".into()),
            ..Default::default()
        };
        patch.apply_to(&mut business);
        assert_eq!(business.short_name, "Market");
        assert_eq!(business.address.as_deref(), Some("Ryazan"));
        assert_eq!(business.full_name, "Shop LLC");
        assert_eq!(business.inn, 7707083893);
    }
}
