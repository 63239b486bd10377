use crate::types::Features;

/// Parses the message of a FEAT reply.
///
/// RFC is specified [RFC 2389](https://datatracker.ietf.org/doc/html/rfc2389#section-3.2).
///
/// This is the syntax of the FEAT response:
///
/// - no-features: "211 [SP] ..."
/// - features-list: "211-...":
///     - ... "feature-label" [[SP] ["description"]]
///     - "211 END"
///
/// The reply reader has already stripped the `211-`/`211 ` markers. The first line is the header and the
/// last one the trailer: the lines in between are features, whether they were indented or carried the
/// `211-` marker. Blank feature lines are skipped. Feature names are stored upper case.
pub fn parse_features(message: &str) -> Features {
    let mut features = Features::new();
    let lines: Vec<&str> = message.lines().collect();
    let feature_lines = lines
        .get(1..lines.len().saturating_sub(1))
        .unwrap_or_default();
    for line in feature_lines {
        let mut tokens = line.trim().split(' ');
        let Some(feature_name) = tokens.next().filter(|name| !name.is_empty()) else {
            trace!("skipping blank feature line");
            continue;
        };
        let feature_values = match tokens.collect::<Vec<&str>>().join(" ") {
            values if values.is_empty() => None,
            values => Some(values),
        };
        debug!("found supported feature: {feature_name}: {feature_values:?}");
        features.insert(feature_name.to_ascii_uppercase(), feature_values);
    }
    features
}

/// Whether the server advertised machine-readable listings (`MLST` or `MLSD`)
pub fn supports_machine_listing(features: &Features) -> bool {
    features.contains_key("MLST") || features.contains_key("MLSD")
}
