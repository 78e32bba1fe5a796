use svgtypes::LengthUnit;

/// A single coordinate read from an `x`/`y` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Coordinate {
    pub value: f64,
    /// `false` when the value carried a unit other than `px`; the number is still used.
    pub user_units: bool,
}

/// First entry of a coordinate list such as `x="10 20 30"`. `Ok(None)` for a blank value.
pub(crate) fn first_coordinate(raw: &str) -> Result<Option<Coordinate>, svgtypes::Error> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match svgtypes::LengthListParser::from(raw).next() {
        None => Ok(None),
        Some(Ok(len)) => Ok(Some(Coordinate {
            value: len.number,
            user_units: is_user_unit(len.unit),
        })),
        Some(Err(err)) => Err(err),
    }
}

/// A single plain number or `px` length.
pub(crate) fn user_length(raw: &str) -> Option<f64> {
    let len = raw.trim().parse::<svgtypes::Length>().ok()?;
    is_user_unit(len.unit).then_some(len.number)
}

fn is_user_unit(unit: LengthUnit) -> bool {
    matches!(unit, LengthUnit::None | LengthUnit::Px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_coordinate_takes_head_of_list() {
        assert_eq!(
            first_coordinate("10 20,30").expect("valid"),
            Some(Coordinate {
                value: 10.0,
                user_units: true
            })
        );
        assert_eq!(first_coordinate("  ").expect("blank"), None);
        assert_eq!(first_coordinate("").expect("empty"), None);
        assert_eq!(
            first_coordinate("2mm").expect("valid"),
            Some(Coordinate {
                value: 2.0,
                user_units: false
            })
        );
        assert!(first_coordinate("abc").is_err());
    }

    #[test]
    fn user_length_accepts_numbers_and_px_only() {
        assert_eq!(user_length("100"), Some(100.0));
        assert_eq!(user_length(" 12.5px "), Some(12.5));
        assert_eq!(user_length("-3e1"), Some(-30.0));
        assert_eq!(user_length("100%"), None);
        assert_eq!(user_length("10cm"), None);
        assert_eq!(user_length("ten"), None);
        assert_eq!(user_length(""), None);
    }
}
