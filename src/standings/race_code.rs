/// Name fragments mapped to 3-letter codes, checked in order.
const RACE_CODES: &[(&[&str], &str)] = &[
    (&["australian"], "AUS"),
    (&["chinese"], "CHN"),
    (&["japanese"], "JPN"),
    (&["bahrain"], "BHR"),
    (&["saudi"], "SAU"),
    (&["miami"], "MIA"),
    (&["emilia", "imola"], "ITA"),
    (&["monaco"], "MCO"),
    (&["spanish", "spain"], "ESP"),
    (&["canadian", "canada"], "CAN"),
    (&["austrian", "austria"], "AUT"),
    (&["british", "silverstone"], "GBR"),
    (&["belgian", "spa"], "BEL"),
    (&["hungarian", "hungary"], "HUN"),
    (&["dutch", "netherlands"], "NED"),
    (&["italian", "monza"], "ITA"),
    (&["madrid"], "MAD"),
    (&["azerbaijan", "baku"], "AZE"),
    (&["singapore"], "SGP"),
    (&["united states", "austin", "cota"], "USA"),
    (&["mexico"], "MEX"),
    (&["brazil", "são paulo", "sao paulo"], "BRA"),
    (&["las vegas"], "LVS"),
    (&["qatar"], "QAT"),
    (&["abu dhabi"], "ABU"),
];

/// Short code for a race name, "GP" when nothing matches.
pub fn race_code(name: &str) -> &'static str {
    let name = name.to_lowercase();
    RACE_CODES
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|f| name.contains(f)))
        .map(|(_, code)| *code)
        .unwrap_or("GP")
}
