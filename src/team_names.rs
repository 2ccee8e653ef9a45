/// Full club names as they appear in squad URLs, mapped to the short form used in
/// the opponent column.
///
/// Only these six are covered. Other clubs whose two spellings differ, such as
/// "Nottingham Forest" / "Nott'ham Forest" or "Sheffield United" /
/// "Sheffield Utd", get no opponent code and fail with `NoOpponentCode`.
pub const TEAM_NAME_ALIASES: [(&str, &str); 6] = [
    ("Brighton and Hove Albion", "Brighton"),
    ("Manchester United", "Manchester Utd"),
    ("Newcastle United", "Newcastle Utd"),
    ("Tottenham Hotspur", "Tottenham"),
    ("West Ham United", "West Ham"),
    ("Wolverhampton Wanderers", "Wolves"),
];

/// Canonical short name for `name`, or `name` itself when it has no alias.
pub fn canonical_team_name(name: &str) -> &str {
    TEAM_NAME_ALIASES
        .iter()
        .find(|(full, _)| *full == name)
        .map_or(name, |&(_, short)| short)
}
