//! METAR/SPECI TAC decoder.
//!
//! Decodes the groups defined by ICAO Annex 3 for routine and special
//! aerodrome reports: report type, station, observation time, wind,
//! visibility, present weather, cloud, temperature, pressure, remarks.
//! Any group that cannot be recognized fails the whole message; a TAC
//! report is a fixed-order telegram, not free text.

use super::EngineError;

/// Report type keyword at the start of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Metar,
    Speci,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Metar => "METAR",
            ReportType::Speci => "SPECI",
        }
    }
}

/// Day-of-month plus UTC time from the `ddhhmmZ` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationTime {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindUnit {
    Knots,
    MetersPerSecond,
}

/// Surface wind group (`dddffGfmfmKT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wind {
    /// Direction in degrees true; `None` for variable (`VRB`)
    pub direction: Option<u16>,
    pub speed: u16,
    pub gust: Option<u16>,
    pub unit: WindUnit,
}

/// Prevailing visibility group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Four-digit metric visibility (9999 = 10 km or more)
    Meters(u16),
    /// Statute miles, kept verbatim ("10", "1/2", "2 1/2" arrives as "1/2")
    StatuteMiles(String),
}

/// One cloud layer (`FEW040`, `BKN015CB`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudLayer {
    pub amount: String,
    /// Base in feet above aerodrome level
    pub base_ft: u32,
    /// CB or TCU suffix when present
    pub convective: Option<String>,
}

/// Altimeter setting group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pressure {
    /// `Qpppp` in whole hectopascals
    Hectopascals(u16),
    /// `Apppp` in hundredths of an inch of mercury
    InchesHgHundredths(u16),
}

/// Fully decoded METAR/SPECI report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMetar {
    pub report_type: ReportType,
    pub corrected: bool,
    pub automated: bool,
    pub station: String,
    pub time: ObservationTime,
    pub cavok: bool,
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    pub weather: Vec<String>,
    pub clouds: Vec<CloudLayer>,
    pub temperature_c: Option<i16>,
    pub dew_point_c: Option<i16>,
    pub pressure: Option<Pressure>,
    pub remarks: Option<String>,
}

/// Decode one TAC message.
///
/// The input may span multiple lines and carry the `=` telegram
/// terminator; both are normalized away before parsing.
pub fn decode_metar(tac: &str) -> Result<DecodedMetar, EngineError> {
    let normalized = tac.trim().trim_end_matches('=').trim();
    let mut tokens = normalized.split_whitespace().peekable();

    // Report type keyword is optional; bare reports default to METAR
    let report_type = match tokens.peek() {
        Some(&"METAR") => {
            tokens.next();
            ReportType::Metar
        }
        Some(&"SPECI") => {
            tokens.next();
            ReportType::Speci
        }
        _ => ReportType::Metar,
    };

    let mut corrected = false;
    if tokens.peek() == Some(&"COR") {
        tokens.next();
        corrected = true;
    }

    let station = tokens
        .next()
        .ok_or_else(|| decode_err("missing station identifier"))?;
    if station.len() != 4 || !station.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(decode_err(format!(
            "invalid station identifier '{station}'"
        )));
    }

    let time_token = tokens
        .next()
        .ok_or_else(|| decode_err("missing observation time"))?;
    let time = parse_time(time_token)?;

    let mut report = DecodedMetar {
        report_type,
        corrected,
        automated: false,
        station: station.to_string(),
        time,
        cavok: false,
        wind: None,
        visibility: None,
        weather: Vec::new(),
        clouds: Vec::new(),
        temperature_c: None,
        dew_point_c: None,
        pressure: None,
        remarks: None,
    };

    while let Some(token) = tokens.next() {
        match token {
            "AUTO" => report.automated = true,
            "CAVOK" => report.cavok = true,
            // No significant cloud / no cloud detected / no significant
            // weather / no significant change: nothing to record
            "NSC" | "NCD" | "NSW" | "NOSIG" => {}
            "RMK" => {
                let rest: Vec<&str> = tokens.by_ref().collect();
                if !rest.is_empty() {
                    report.remarks = Some(rest.join(" "));
                }
                break;
            }
            _ => {
                if let Some(wind) = parse_wind(token) {
                    report.wind = Some(wind);
                } else if let Some(vis) = parse_visibility(token) {
                    report.visibility = Some(vis);
                } else if let Some(layer) = parse_cloud(token) {
                    report.clouds.push(layer);
                } else if let Some((t, d)) = parse_temperatures(token) {
                    report.temperature_c = Some(t);
                    report.dew_point_c = d;
                } else if let Some(p) = parse_pressure(token) {
                    report.pressure = Some(p);
                } else if is_wind_variation(token) || is_rvr(token) || is_vertical_visibility(token)
                {
                    // Recognized but not modelled; skip
                } else if is_weather_group(token) {
                    report.weather.push(token.to_string());
                } else {
                    return Err(decode_err(format!("unrecognized group '{token}'")));
                }
            }
        }
    }

    Ok(report)
}

fn decode_err(detail: impl Into<String>) -> EngineError {
    EngineError::Decode(detail.into())
}

/// `ddhhmmZ`
fn parse_time(token: &str) -> Result<ObservationTime, EngineError> {
    let digits = token
        .strip_suffix('Z')
        .ok_or_else(|| decode_err(format!("invalid observation time '{token}'")))?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(decode_err(format!("invalid observation time '{token}'")));
    }
    let day: u8 = digits[0..2].parse().unwrap_or(0);
    let hour: u8 = digits[2..4].parse().unwrap_or(99);
    let minute: u8 = digits[4..6].parse().unwrap_or(99);
    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return Err(decode_err(format!("observation time out of range '{token}'")));
    }
    Ok(ObservationTime { day, hour, minute })
}

/// `dddffKT`, `VRBffKT`, `dddffGfmfmKT`, `dddffMPS`
fn parse_wind(token: &str) -> Option<Wind> {
    let (body, unit) = if let Some(b) = token.strip_suffix("KT") {
        (b, WindUnit::Knots)
    } else if let Some(b) = token.strip_suffix("MPS") {
        (b, WindUnit::MetersPerSecond)
    } else {
        return None;
    };

    let (dir_part, rest) = body.split_at_checked(3)?;
    let direction = if dir_part == "VRB" {
        None
    } else {
        let deg: u16 = dir_part.parse().ok()?;
        if deg > 360 {
            return None;
        }
        Some(deg)
    };

    let (speed_part, gust_part) = match rest.split_once('G') {
        Some((s, g)) => (s, Some(g)),
        None => (rest, None),
    };
    if speed_part.len() < 2 || speed_part.len() > 3 {
        return None;
    }
    let speed: u16 = speed_part.parse().ok()?;
    let gust = match gust_part {
        Some(g) => Some(g.parse().ok()?),
        None => None,
    };

    Some(Wind {
        direction,
        speed,
        gust,
        unit,
    })
}

/// `9999` (meters) or `10SM` / `1/2SM` (statute miles)
fn parse_visibility(token: &str) -> Option<Visibility> {
    if let Some(miles) = token.strip_suffix("SM") {
        let plain = miles.strip_prefix('M').unwrap_or(miles); // M1/4SM = less than
        let valid = !plain.is_empty()
            && plain
                .chars()
                .all(|c| c.is_ascii_digit() || c == '/');
        if valid {
            return Some(Visibility::StatuteMiles(miles.to_string()));
        }
        return None;
    }
    if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        return Some(Visibility::Meters(token.parse().ok()?));
    }
    None
}

/// `FEWhhh`, `SCThhh`, `BKNhhh`, `OVChhh`, optional CB/TCU suffix
fn parse_cloud(token: &str) -> Option<CloudLayer> {
    let amount = token.get(0..3)?;
    if !matches!(amount, "FEW" | "SCT" | "BKN" | "OVC") {
        return None;
    }
    let rest = &token[3..];
    let (height, convective) = if let Some(h) = rest.strip_suffix("CB") {
        (h, Some("CB"))
    } else if let Some(h) = rest.strip_suffix("TCU") {
        (h, Some("TCU"))
    } else {
        (rest, None)
    };
    if height.len() != 3 || !height.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hundreds: u32 = height.parse().ok()?;
    Some(CloudLayer {
        amount: amount.to_string(),
        base_ft: hundreds * 100,
        convective: convective.map(str::to_string),
    })
}

/// `15/07`, `M05/M12`, `15/` (dew point missing)
fn parse_temperatures(token: &str) -> Option<(i16, Option<i16>)> {
    let (t, d) = token.split_once('/')?;
    let temp = parse_signed_temp(t)?;
    let dew = if d.is_empty() {
        None
    } else {
        Some(parse_signed_temp(d)?)
    };
    Some((temp, dew))
}

fn parse_signed_temp(s: &str) -> Option<i16> {
    let (neg, digits) = match s.strip_prefix('M') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i16 = digits.parse().ok()?;
    Some(if neg { -value } else { value })
}

/// `A3005` (inHg hundredths) or `Q1013` (hPa)
fn parse_pressure(token: &str) -> Option<Pressure> {
    let (kind, digits) = token.split_at_checked(1)?;
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match kind {
        "A" => Some(Pressure::InchesHgHundredths(digits.parse().ok()?)),
        "Q" => Some(Pressure::Hectopascals(digits.parse().ok()?)),
        _ => None,
    }
}

/// Wind direction variation, e.g. `170V250`
fn is_wind_variation(token: &str) -> bool {
    matches!(token.split_once('V'), Some((a, b))
        if a.len() == 3 && b.len() == 3
            && a.chars().all(|c| c.is_ascii_digit())
            && b.chars().all(|c| c.is_ascii_digit()))
}

/// Runway visual range, e.g. `R28L/2600FT`
fn is_rvr(token: &str) -> bool {
    token.starts_with('R')
        && token.contains('/')
        && token.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
}

/// Vertical visibility, e.g. `VV004`
fn is_vertical_visibility(token: &str) -> bool {
    token.len() == 5
        && token.starts_with("VV")
        && token[2..].chars().all(|c| c.is_ascii_digit())
}

/// Present-weather group: optional +/- intensity or VC proximity prefix
/// followed by pairs of letters (RA, SHRA, TSRA, FZDZ, BR, FG, ...).
fn is_weather_group(token: &str) -> bool {
    let body = token
        .strip_prefix('+')
        .or_else(|| token.strip_prefix('-'))
        .unwrap_or(token);
    let body = body.strip_prefix("VC").unwrap_or(body);
    !body.is_empty()
        && body.len() % 2 == 0
        && body.len() <= 8
        && body.chars().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_us_style_report() {
        let m = decode_metar("METAR KJFK 231751Z 18012KT 10SM FEW040 15/07 A3005").unwrap();
        assert_eq!(m.report_type, ReportType::Metar);
        assert_eq!(m.station, "KJFK");
        assert_eq!(
            m.time,
            ObservationTime {
                day: 23,
                hour: 17,
                minute: 51
            }
        );
        let wind = m.wind.unwrap();
        assert_eq!(wind.direction, Some(180));
        assert_eq!(wind.speed, 12);
        assert_eq!(wind.unit, WindUnit::Knots);
        assert_eq!(m.visibility, Some(Visibility::StatuteMiles("10".into())));
        assert_eq!(m.clouds.len(), 1);
        assert_eq!(m.clouds[0].base_ft, 4000);
        assert_eq!(m.temperature_c, Some(15));
        assert_eq!(m.dew_point_c, Some(7));
        assert_eq!(m.pressure, Some(Pressure::InchesHgHundredths(3005)));
    }

    #[test]
    fn decodes_metric_report_with_weather_and_qnh() {
        let m = decode_metar("SPECI EGLL 120650Z VRB03KT 0800 FG BKN002 M01/M02 Q1024").unwrap();
        assert_eq!(m.report_type, ReportType::Speci);
        assert_eq!(m.wind.unwrap().direction, None);
        assert_eq!(m.visibility, Some(Visibility::Meters(800)));
        assert_eq!(m.weather, vec!["FG".to_string()]);
        assert_eq!(m.temperature_c, Some(-1));
        assert_eq!(m.dew_point_c, Some(-2));
        assert_eq!(m.pressure, Some(Pressure::Hectopascals(1024)));
    }

    #[test]
    fn accepts_cavok_auto_and_remarks() {
        let m = decode_metar("METAR LFPG 120700Z AUTO 27008KT CAVOK 18/12 Q1018 RMK AO2").unwrap();
        assert!(m.automated);
        assert!(m.cavok);
        assert_eq!(m.remarks.as_deref(), Some("AO2"));
    }

    #[test]
    fn bare_report_without_keyword_defaults_to_metar() {
        let m = decode_metar("KSFO 010156Z 28016KT 9SM SCT200 14/09 A3012=").unwrap();
        assert_eq!(m.report_type, ReportType::Metar);
        assert_eq!(m.station, "KSFO");
    }

    #[test]
    fn rejects_bad_station() {
        let err = decode_metar("METAR jfk1 231751Z").unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn rejects_out_of_range_time() {
        let err = decode_metar("METAR KJFK 329999Z").unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn rejects_unrecognized_group() {
        let err = decode_metar("METAR KJFK 231751Z BANANA42").unwrap_err();
        match err {
            EngineError::Decode(msg) => assert!(msg.contains("BANANA42")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
