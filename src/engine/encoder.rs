//! IWXXM XML encoder.
//!
//! Serializes a [`DecodedMetar`] into an IWXXM-style XML document. The
//! original TAC message is embedded verbatim in an extension block so
//! downstream consumers can always recover the source telegram.

use super::EngineError;
use super::decoder::{DecodedMetar, Pressure, Visibility, WindUnit};

const IWXXM_NS: &str = "http://icao.int/iwxxm/3.0";

/// Encode a decoded report as IWXXM XML text.
pub fn encode_iwxxm(report: &DecodedMetar, tac: &str) -> Result<String, EngineError> {
    if report.station.is_empty() {
        return Err(EngineError::Encode("missing aerodrome designator".into()));
    }

    let root = report.report_type.as_str();
    let status = if report.corrected { "CORRECTION" } else { "NORMAL" };

    let mut xml = String::with_capacity(1024);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<iwxxm:{root} xmlns:iwxxm=\"{IWXXM_NS}\" reportStatus=\"{status}\" automatedStation=\"{}\">\n",
        report.automated
    ));

    push_element(&mut xml, "aerodrome", &report.station);
    xml.push_str(&format!(
        "  <iwxxm:observationTime day=\"{:02}\" hour=\"{:02}\" minute=\"{:02}\"/>\n",
        report.time.day, report.time.hour, report.time.minute
    ));

    if let Some(wind) = &report.wind {
        let uom = match wind.unit {
            WindUnit::Knots => "[kn_i]",
            WindUnit::MetersPerSecond => "m/s",
        };
        let mut attrs = format!("speed=\"{}\" uom=\"{}\"", wind.speed, escape(uom));
        match wind.direction {
            Some(deg) => attrs.push_str(&format!(" direction=\"{deg}\"")),
            None => attrs.push_str(" variableDirection=\"true\""),
        }
        if let Some(gust) = wind.gust {
            attrs.push_str(&format!(" gustSpeed=\"{gust}\""));
        }
        xml.push_str(&format!("  <iwxxm:surfaceWind {attrs}/>\n"));
    }

    if report.cavok {
        xml.push_str("  <iwxxm:cloudAndVisibilityOK>true</iwxxm:cloudAndVisibilityOK>\n");
    }

    if let Some(vis) = &report.visibility {
        match vis {
            Visibility::Meters(m) => {
                xml.push_str(&format!(
                    "  <iwxxm:prevailingVisibility uom=\"m\">{m}</iwxxm:prevailingVisibility>\n"
                ));
            }
            Visibility::StatuteMiles(miles) => {
                xml.push_str(&format!(
                    "  <iwxxm:prevailingVisibility uom=\"[mi_i]\">{}</iwxxm:prevailingVisibility>\n",
                    escape(miles)
                ));
            }
        }
    }

    for weather in &report.weather {
        push_element(&mut xml, "presentWeather", weather);
    }

    if !report.clouds.is_empty() {
        xml.push_str("  <iwxxm:cloud>\n");
        for layer in &report.clouds {
            let convective = layer
                .convective
                .as_deref()
                .map(|t| format!(" cloudType=\"{t}\""))
                .unwrap_or_default();
            xml.push_str(&format!(
                "    <iwxxm:layer amount=\"{}\" base=\"{}\" uom=\"[ft_i]\"{convective}/>\n",
                escape(&layer.amount),
                layer.base_ft
            ));
        }
        xml.push_str("  </iwxxm:cloud>\n");
    }

    if let Some(temp) = report.temperature_c {
        push_element(&mut xml, "airTemperature", &temp.to_string());
    }
    if let Some(dew) = report.dew_point_c {
        push_element(&mut xml, "dewpointTemperature", &dew.to_string());
    }

    if let Some(pressure) = &report.pressure {
        match pressure {
            Pressure::Hectopascals(hpa) => {
                xml.push_str(&format!("  <iwxxm:qnh uom=\"hPa\">{hpa}</iwxxm:qnh>\n"));
            }
            Pressure::InchesHgHundredths(hundredths) => {
                xml.push_str(&format!(
                    "  <iwxxm:qnh uom=\"[in_i]\">{}.{:02}</iwxxm:qnh>\n",
                    hundredths / 100,
                    hundredths % 100
                ));
            }
        }
    }

    if let Some(remarks) = &report.remarks {
        push_element(&mut xml, "remarks", remarks);
    }

    xml.push_str("  <iwxxm:extension>\n");
    xml.push_str(&format!(
        "    <iwxxm:originalTac>{}</iwxxm:originalTac>\n",
        escape(tac)
    ));
    xml.push_str("  </iwxxm:extension>\n");
    xml.push_str(&format!("</iwxxm:{root}>\n"));

    Ok(xml)
}

fn push_element(xml: &mut String, name: &str, text: &str) {
    xml.push_str(&format!(
        "  <iwxxm:{name}>{}</iwxxm:{name}>\n",
        escape(text)
    ));
}

/// Minimal XML text/attribute escaping.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::decoder::decode_metar;

    #[test]
    fn encodes_us_style_report() {
        let tac = "METAR KJFK 231751Z 18012G20KT 10SM FEW040 15/07 A3005";
        let report = decode_metar(tac).unwrap();
        let xml = encode_iwxxm(&report, tac).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("<iwxxm:aerodrome>KJFK</iwxxm:aerodrome>"));
        assert!(xml.contains("day=\"23\" hour=\"17\" minute=\"51\""));
        assert!(xml.contains("gustSpeed=\"20\""));
        assert!(xml.contains("<iwxxm:qnh uom=\"[in_i]\">30.05</iwxxm:qnh>"));
        assert!(xml.contains("<iwxxm:originalTac>METAR KJFK"));
        assert!(xml.trim_end().ends_with("</iwxxm:METAR>"));
    }

    #[test]
    fn speci_uses_its_own_root_element() {
        let tac = "SPECI EGLL 120650Z VRB03KT 0800 FG BKN002 M01/M02 Q1024";
        let report = decode_metar(tac).unwrap();
        let xml = encode_iwxxm(&report, tac).unwrap();

        assert!(xml.contains("<iwxxm:SPECI"));
        assert!(xml.contains("variableDirection=\"true\""));
        assert!(xml.contains("<iwxxm:qnh uom=\"hPa\">1024</iwxxm:qnh>"));
        assert!(xml.trim_end().ends_with("</iwxxm:SPECI>"));
    }

    #[test]
    fn escapes_reserved_characters_in_embedded_tac() {
        let tac = "METAR KJFK 231751Z 18012KT 10SM FEW040 15/07 A3005";
        let report = decode_metar(tac).unwrap();
        let xml = encode_iwxxm(&report, "METAR KJFK <>&").unwrap();
        assert!(xml.contains("METAR KJFK &lt;&gt;&amp;"));
    }
}
