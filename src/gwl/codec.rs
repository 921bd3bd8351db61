//! Worklist wire format
//!
//! Every command renders to exactly one `;`-separated line. Absent fields are
//! rendered as empty strings and volumes always carry a decimal point
//! (`10.0`, `12.25`).
//!
//! ```text
//! A;RackLabel;RackID;RackType;Position;TubeID;Volume;LiquidClass;TipType;TipMask;ForceRackType
//! R;SrcRackLabel;SrcRackID;SrcRackType;SrcPosStart;SrcPosEnd;DestRackLabel;DestRackID;DestRackType;DestPosStart;DestPosEnd;Volume;LiquidClass;NoOfDiTiReuses;NoOfMultiDisp;Direction;ExcludedDestWell
//! ```

use super::command::{Command, ReagentDistribution, Transfer};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Fields after the command id on an `A`/`D` line
const TRANSFER_FIELDS: usize = 10;
/// Older worklists omit the trailing ForceRackType field
const TRANSFER_FIELDS_LEGACY: usize = 9;
/// Fields after the command id on an `R` line, ExcludedDestWell included
const DISTRIBUTION_FIELDS: usize = 16;

/// Render a volume the way the robot software expects: integral values keep
/// a trailing `.0`.
#[must_use]
pub fn format_volume(volume: f64) -> String {
    if volume.fract() == 0.0 && volume.abs() < 1e15 {
        format!("{volume:.1}")
    } else {
        format!("{volume}")
    }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn write_transfer(f: &mut fmt::Formatter<'_>, id: char, t: &Transfer) -> fmt::Result {
    write!(
        f,
        "{id};{};{};{};{};{};{};{};{};{};{}",
        t.rack_label,
        opt(&t.rack_id),
        t.rack_type,
        t.position,
        opt(&t.tube_id),
        format_volume(t.volume),
        t.liquid_class,
        opt(&t.tip_type),
        opt(&t.tip_mask),
        opt(&t.force_rack_type),
    )
}

impl fmt::Display for ReagentDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R;{};{};{};{};{};{};{};{};{};{};{};{};{};{};{};{}",
            self.src_rack_label,
            opt(&self.src_rack_id),
            self.src_rack_type,
            self.src_pos_start,
            self.src_pos_end,
            self.dest_rack_label,
            opt(&self.dest_rack_id),
            self.dest_rack_type,
            self.dest_pos_start,
            self.dest_pos_end,
            format_volume(self.volume),
            self.liquid_class,
            self.n_tip_reuse,
            self.n_multi_disp,
            self.direction,
            self.excluded_wells_field(),
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Aspirate(t) => write_transfer(f, 'A', t),
            Command::Dispense(t) => write_transfer(f, 'D', t),
            Command::ReagentDistribution(rd) => rd.fmt(f),
            Command::Comment(text) => {
                let text = text.strip_prefix("C;").unwrap_or(text);
                write!(f, "C;{text}")
            }
            Command::Waste => f.write_str("W;"),
            Command::Flush => f.write_str("F;"),
            Command::Break => f.write_str("B;"),
        }
    }
}

/// Parses one worklist line. Line numbers in errors are left at 0; use
/// [`parse_worklist`] to get them filled in.
impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (id, rest) = line.split_once(';').unwrap_or((line, ""));
        match id {
            "A" => Ok(Command::Aspirate(parse_transfer(rest)?)),
            "D" => Ok(Command::Dispense(parse_transfer(rest)?)),
            "R" => Ok(Command::ReagentDistribution(parse_distribution(rest)?)),
            "C" => Ok(Command::Comment(rest.to_string())),
            "W" => Ok(Command::Waste),
            "F" => Ok(Command::Flush),
            "B" => Ok(Command::Break),
            other => Err(invalid(format!("unknown command id \"{other}\""))),
        }
    }
}

/// Parse a whole worklist, one command per non-empty line
pub fn parse_worklist(text: &str) -> Result<Vec<Command>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.parse::<Command>().map_err(|e| match e {
                Error::InvalidWorklist { reason, .. } => Error::InvalidWorklist {
                    line: i + 1,
                    reason,
                },
                other => other,
            })
        })
        .collect()
}

fn invalid(reason: String) -> Error {
    Error::InvalidWorklist { line: 0, reason }
}

fn non_empty(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn parse_number<T: FromStr>(field: &str, name: &str) -> Result<T> {
    field
        .trim()
        .parse()
        .map_err(|_| invalid(format!("{name} \"{field}\" is not a number")))
}

fn parse_transfer(rest: &str) -> Result<Transfer> {
    let fields: Vec<&str> = rest.split(';').collect();
    if fields.len() != TRANSFER_FIELDS && fields.len() != TRANSFER_FIELDS_LEGACY {
        return Err(invalid(format!(
            "expected {TRANSFER_FIELDS} fields after the command id, found {}",
            fields.len()
        )));
    }
    Ok(Transfer {
        rack_label: fields[0].to_string(),
        rack_id: non_empty(fields[1]),
        rack_type: fields[2].to_string(),
        position: parse_number(fields[3], "Position")?,
        tube_id: non_empty(fields[4]),
        volume: parse_number(fields[5], "Volume")?,
        liquid_class: fields[6].to_string(),
        tip_type: non_empty(fields[7]),
        tip_mask: non_empty(fields[8]),
        force_rack_type: fields.get(9).and_then(|f| non_empty(f)),
    })
}

fn parse_distribution(rest: &str) -> Result<ReagentDistribution> {
    let fields: Vec<&str> = rest.split(';').collect();
    // ExcludedDestWell is itself `;`-separated, so it takes the remaining fields
    if fields.len() < DISTRIBUTION_FIELDS - 1 {
        return Err(invalid(format!(
            "expected at least {} fields after the command id, found {}",
            DISTRIBUTION_FIELDS - 1,
            fields.len()
        )));
    }
    let excluded_dest_wells = fields[DISTRIBUTION_FIELDS - 1..]
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| parse_number(f, "ExcludedDestWell"))
        .collect::<Result<_>>()?;

    Ok(ReagentDistribution {
        src_rack_label: fields[0].to_string(),
        src_rack_id: non_empty(fields[1]),
        src_rack_type: fields[2].to_string(),
        src_pos_start: parse_number(fields[3], "SrcPosStart")?,
        src_pos_end: parse_number(fields[4], "SrcPosEnd")?,
        dest_rack_label: fields[5].to_string(),
        dest_rack_id: non_empty(fields[6]),
        dest_rack_type: fields[7].to_string(),
        dest_pos_start: parse_number(fields[8], "DestPosStart")?,
        dest_pos_end: parse_number(fields[9], "DestPosEnd")?,
        volume: parse_number(fields[10], "Volume")?,
        liquid_class: fields[11].to_string(),
        n_tip_reuse: parse_number(fields[12], "NoOfDiTiReuses")?,
        n_multi_disp: parse_number(fields[13], "NoOfMultiDisp")?,
        direction: parse_number(fields[14], "Direction")?,
        excluded_dest_wells,
        tip_type: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(10.0), "10.0");
        assert_eq!(format_volume(0.0), "0.0");
        assert_eq!(format_volume(12.25), "12.25");
        assert_eq!(format_volume(3.1), "3.1");
    }

    #[test]
    fn test_aspirate_line() {
        let mut t = Transfer::new("Sample plate", "96 Well Skirted PCR", 12, 10.0);
        t.tip_type = Some("FCA, 50ul SBS".to_string());
        assert_eq!(
            Command::Aspirate(t).to_string(),
            "A;Sample plate;;96 Well Skirted PCR;12;;10.0;Water Free Single;FCA, 50ul SBS;;"
        );
    }

    #[test]
    fn test_reagent_distribution_line() {
        let mut rd = ReagentDistribution::new(
            "100ml_2",
            "100ml_1",
            "96 Well Skirted PCR[003]",
            "96 Well Skirted PCR",
            20.0,
        );
        rd.dest_pos_end = 96;
        assert_eq!(
            rd.to_string(),
            "R;100ml_2;;100ml_1;1;1;96 Well Skirted PCR[003];;96 Well Skirted PCR;1;96;20.0;Water Free Multi;1;5;0;"
        );

        rd.excluded_dest_wells = [4, 2].into_iter().collect();
        assert!(rd.to_string().ends_with(";0;2;4"));
    }

    #[test]
    fn test_simple_lines() {
        assert_eq!(Command::Waste.to_string(), "W;");
        assert_eq!(Command::Flush.to_string(), "F;");
        assert_eq!(Command::Break.to_string(), "B;");
        assert_eq!(Command::comment("C;mastermix").to_string(), "C;mastermix");
        assert_eq!(Command::comment("samples").to_string(), "C;samples");
    }

    #[test]
    fn test_parse_aspirate_with_and_without_force_rack_type() {
        let cmd: Command = "A;Plate;;96 Well Skirted PCR;3;;5.5;Water Free Single;;;"
            .parse()
            .unwrap();
        match cmd {
            Command::Aspirate(t) => {
                assert_eq!(t.position, 3);
                assert_eq!(t.volume, 5.5);
                assert_eq!(t.rack_id, None);
                assert_eq!(t.tip_type, None);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cmd: Command = "D;Plate;;96 Well Skirted PCR;3;;5.5;Water Free Single;;"
            .parse()
            .unwrap();
        assert!(matches!(cmd, Command::Dispense(_)));
    }

    #[test]
    fn test_parse_reagent_distribution_exclusions() {
        let line = "R;MM;;25ml_1 waste;1;1;PCR;;96 Well Skirted PCR;1;96;12.0;Water Free Multi;4;6;0;3;7;90";
        let cmd: Command = line.parse().unwrap();
        let Command::ReagentDistribution(rd) = &cmd else {
            panic!("expected reagent distribution");
        };
        assert_eq!(rd.n_tip_reuse, 4);
        assert_eq!(rd.n_multi_disp, 6);
        assert_eq!(
            rd.excluded_dest_wells.iter().copied().collect::<Vec<_>>(),
            vec![3, 7, 90]
        );
        assert_eq!(cmd.to_string(), line);
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(matches!(
            "X;foo".parse::<Command>(),
            Err(Error::InvalidWorklist { .. })
        ));
        assert!("A;Plate;;96 Well;1".parse::<Command>().is_err());
        assert!("A;Plate;;96 Well;one;;5;LC;;;".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_worklist_reports_line_number() {
        let text = "C;start\nW;\nQ;bad\n";
        match parse_worklist(text) {
            Err(Error::InvalidWorklist { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(parse_worklist("C;a\nB;\n").unwrap().len(), 2);
    }
}
