//! Conversion between well ids (`B3`) and 1-based column-wise positions

use crate::error::{Error, Result};

/// Rows and columns of a plate with `wells` wells
fn grid(wells: u32) -> Result<(u32, u32)> {
    match wells {
        96 => Ok((8, 12)),
        384 => Ok((16, 24)),
        other => Err(Error::Validation(format!(
            "Well ids are only defined for 96 and 384 well plates, not {other}"
        ))),
    }
}

/// Well id of a position, counting down each column first (`9` -> `A2`)
pub fn position_to_well(position: u32, wells: u32) -> Result<String> {
    let (rows, _) = grid(wells)?;
    if position == 0 || position > wells {
        return Err(Error::Validation(format!(
            "Position {position} is outside a {wells} well plate"
        )));
    }
    let index = position - 1;
    let row = char::from(b'A' + (index % rows) as u8);
    Ok(format!("{row}{}", index / rows + 1))
}

/// Position of a well id such as `A1`, `b03` or `P24`
pub fn well_to_position(well: &str, wells: u32) -> Result<u32> {
    let (rows, cols) = grid(wells)?;
    let invalid = || Error::Validation(format!("Invalid well id \"{well}\" for a {wells} well plate"));

    let well = well.trim();
    let mut chars = well.chars();
    let row = chars
        .next()
        .filter(char::is_ascii_alphabetic)
        .ok_or_else(invalid)?
        .to_ascii_uppercase();
    let row = u32::from(row) - u32::from('A') + 1;
    let col: u32 = chars.as_str().parse().map_err(|_| invalid())?;
    if row > rows || col == 0 || col > cols {
        return Err(invalid());
    }
    Ok((col - 1) * rows + row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_to_well_96() {
        assert_eq!(position_to_well(1, 96).unwrap(), "A1");
        assert_eq!(position_to_well(8, 96).unwrap(), "H1");
        assert_eq!(position_to_well(9, 96).unwrap(), "A2");
        assert_eq!(position_to_well(96, 96).unwrap(), "H12");
    }

    #[test]
    fn test_position_to_well_384() {
        assert_eq!(position_to_well(16, 384).unwrap(), "P1");
        assert_eq!(position_to_well(17, 384).unwrap(), "A2");
        assert_eq!(position_to_well(384, 384).unwrap(), "P24");
    }

    #[test]
    fn test_well_to_position() {
        assert_eq!(well_to_position("A1", 96).unwrap(), 1);
        assert_eq!(well_to_position("b03", 96).unwrap(), 18);
        assert_eq!(well_to_position("H12", 96).unwrap(), 96);
        assert_eq!(well_to_position("P24", 384).unwrap(), 384);
    }

    #[test]
    fn test_invalid_wells_rejected() {
        assert!(well_to_position("I1", 96).is_err());
        assert!(well_to_position("A13", 96).is_err());
        assert!(well_to_position("A0", 96).is_err());
        assert!(well_to_position("11", 96).is_err());
        assert!(well_to_position("A1", 24).is_err());
        assert!(position_to_well(97, 96).is_err());
        assert!(position_to_well(0, 384).is_err());
    }

    #[test]
    fn test_round_trip_every_well() {
        for wells in [96, 384] {
            for position in 1..=wells {
                let id = position_to_well(position, wells).unwrap();
                assert_eq!(well_to_position(&id, wells).unwrap(), position);
            }
        }
    }
}
