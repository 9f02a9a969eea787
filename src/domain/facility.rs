use std::collections::HashSet;

use crate::error::{PipelineError, Result};

/// Facility category, used by map renderers to pick a marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityKind {
    Hospital,
    BirthingCenter,
    HomeAccessMidwife,
    Other(String),
}

impl FacilityKind {
    /// Classify a free-form `type` tag from a facility feed
    pub fn from_tag(tag: &str) -> FacilityKind {
        match tag.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "hospital" => FacilityKind::Hospital,
            "birthing center" | "birth center" => FacilityKind::BirthingCenter,
            "home access midwife" | "midwife" => FacilityKind::HomeAccessMidwife,
            _ => FacilityKind::Other(tag.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            FacilityKind::Hospital => "hospital",
            FacilityKind::BirthingCenter => "birthing center",
            FacilityKind::HomeAccessMidwife => "home access midwife",
            FacilityKind::Other(tag) => tag,
        }
    }
}

/// A facility location
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub name: String,
    /// (lat, lon) in WGS84 degrees
    pub position: (f64, f64),
    pub kind: FacilityKind,
    /// Planned closure; excluded from runs that model the future network
    pub will_be_removed: bool,
}

impl Facility {
    pub fn new(name: impl Into<String>, position: (f64, f64), kind: FacilityKind) -> Self {
        Self {
            name: name.into(),
            position,
            kind,
            will_be_removed: false,
        }
    }

    pub fn lat(&self) -> f64 {
        self.position.0
    }

    pub fn lon(&self) -> f64 {
        self.position.1
    }
}

/// Check that a facility list is usable as a distance source set.
///
/// Rejects an empty list, duplicate names and non-finite coordinates.
pub fn validate_facilities(facilities: &[Facility]) -> Result<()> {
    if facilities.is_empty() {
        return Err(PipelineError::invalid("no facilities provided"));
    }

    let mut seen = HashSet::with_capacity(facilities.len());
    for facility in facilities {
        if !seen.insert(facility.name.as_str()) {
            return Err(PipelineError::invalid(format!(
                "duplicate facility name: {}",
                facility.name
            )));
        }
        if !facility.lat().is_finite() || !facility.lon().is_finite() {
            return Err(PipelineError::invalid(format!(
                "facility {} has a non-finite position",
                facility.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(FacilityKind::from_tag("hospital"), FacilityKind::Hospital);
        assert_eq!(
            FacilityKind::from_tag("Birthing Center"),
            FacilityKind::BirthingCenter
        );
        assert_eq!(
            FacilityKind::from_tag("home_access_midwife"),
            FacilityKind::HomeAccessMidwife
        );
        assert_eq!(
            FacilityKind::from_tag("clinic"),
            FacilityKind::Other("clinic".to_string())
        );
    }

    #[test]
    fn test_validate_empty() {
        let err = validate_facilities(&[]).unwrap_err();
        assert_eq!(err, PipelineError::invalid("no facilities provided"));
    }

    #[test]
    fn test_validate_duplicates() {
        let facilities = vec![
            Facility::new("Salem Hospital", (44.93, -123.01), FacilityKind::Hospital),
            Facility::new("Salem Hospital", (44.94, -123.02), FacilityKind::Hospital),
        ];
        assert!(validate_facilities(&facilities).is_err());
    }

    #[test]
    fn test_validate_non_finite() {
        let facilities = vec![Facility::new("Nowhere", (f64::NAN, 0.0), FacilityKind::Hospital)];
        assert!(validate_facilities(&facilities).is_err());
    }
}
