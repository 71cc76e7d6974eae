//! Classification pattern tables
//!
//! All pattern sets are ordered data so they can be tested in isolation and
//! reordered without touching control flow.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid classification pattern"))
        .collect()
}

/// Phrasal templates that mark a query as evergreen regardless of any
/// temporal keywords it also contains. Checked first; order matters.
pub(super) static EVERGREEN_TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"who was the first",
        r"what year did",
        r"definition of",
        r"what is a\b",
        r"how do you",
        r"history of",
    ])
});

/// Keywords signalling that the answer changes with time.
pub(super) static TEMPORAL_KEYWORDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\btoday\b",
        r"\bnow\b",
        r"\bcurrent(ly)?\b",
        r"\blatest\b",
        r"\brecent(ly)?\b",
        r"\byesterday\b",
        r"\btomorrow\b",
        r"\btonight\b",
        r"\bthis week\b",
    ])
});

/// Keywords for domains whose answers are inherently volatile.
pub(super) static DOMAIN_KEYWORDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\bweather\b",
        r"\bforecast\b",
        r"\bnews\b",
        r"\bheadlines?\b",
        r"\bstock\b",
        r"\bprice\b",
        r"\bmarket\b",
        r"\bbitcoin\b",
        r"\bscore\b",
        r"\bgame\b",
        r"\bmatch\b",
    ])
});

/// Topic partition rules. Ordered; the first rule with any matching keyword
/// assigns the topic.
pub(super) static TOPIC_RULES: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    vec![
        (
            "weather",
            compile(&[
                r"\bweather\b",
                r"\bforecast\b",
                r"\btemperature\b",
                r"\brain(ing|y)?\b",
                r"\bsunny\b",
                r"\bcloudy\b",
                r"\bsnow(ing|y)?\b",
                r"\bhumidity\b",
                r"\bclimate\b",
            ]),
        ),
        (
            "finance",
            compile(&[
                r"\bstock\b",
                r"\bprice\b",
                r"\bmarket\b",
                r"\btrading\b",
                r"\bbitcoin\b",
                r"\bcrypto\b",
                r"\binvest(ment|ing)?\b",
                r"\bdividend\b",
                r"\bshares?\b",
                r"\bportfolio\b",
                r"\bnasdaq\b",
            ]),
        ),
        (
            "sports",
            compile(&[
                r"\bscore\b",
                r"\bgame\b",
                r"\bmatch\b",
                r"\bteam\b",
                r"\bplayer\b",
                r"\bchampion(ship)?\b",
                r"\bleague\b",
                r"\btournament\b",
                r"\bfootball\b",
                r"\bbasketball\b",
                r"\bsoccer\b",
                r"\btennis\b",
                r"\bolympic\b",
            ]),
        ),
        (
            "technology",
            compile(&[
                r"\bprogramming\b",
                r"\bsoftware\b",
                r"\bcode\b",
                r"\bcomputer\b",
                r"\balgorithm\b",
                r"\bdatabase\b",
                r"\bapi\b",
                r"\bpython\b",
                r"\bjavascript\b",
                r"\brust\b",
                r"\bmachine learning\b",
                r"\bartificial intelligence\b",
                r"\bneural\b",
                r"\bframework\b",
            ]),
        ),
        (
            "science",
            compile(&[
                r"\bphysics\b",
                r"\bchemistry\b",
                r"\bbiology\b",
                r"\bmath(ematics)?\b",
                r"\bscien(ce|tific|tist)\b",
                r"\batom\b",
                r"\bmolecule\b",
                r"\bcell\b",
                r"\bdna\b",
                r"\bevolution\b",
                r"\bexperiment\b",
                r"\bquantum\b",
                r"\bgravity\b",
            ]),
        ),
        (
            "history",
            compile(&[
                r"\bhistory\b",
                r"\bhistorical\b",
                r"\bwar\b",
                r"\bcentury\b",
                r"\bancient\b",
                r"\bempire\b",
                r"\bking\b",
                r"\bqueen\b",
                r"\bpresident\b",
                r"\brevolution\b",
                r"\bcivilization\b",
                r"\bmedieval\b",
            ]),
        ),
        (
            "geography",
            compile(&[
                r"\bcapital\b",
                r"\bcountry\b",
                r"\bcity\b",
                r"\bcontinent\b",
                r"\bocean\b",
                r"\bmountain\b",
                r"\briver\b",
                r"\bisland\b",
                r"\bpopulation\b",
                r"\bgeograph(y|ical)\b",
                r"\bregion\b",
            ]),
        ),
        (
            "news",
            compile(&[
                r"\bnews\b",
                r"\bheadlines?\b",
                r"\bbreaking\b",
                r"\breport(ed|ing)?\b",
                r"\bannounce(d|ment)?\b",
                r"\belection\b",
                r"\bpolitics\b",
                r"\bgovernment\b",
            ]),
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_compile() {
        assert_eq!(EVERGREEN_TEMPLATES.len(), 6);
        assert_eq!(TEMPORAL_KEYWORDS.len(), 9);
        assert_eq!(DOMAIN_KEYWORDS.len(), 11);
        assert_eq!(TOPIC_RULES.len(), 8);
    }

    #[test]
    fn test_topic_rule_order() {
        // Lookup precision depends on this ordering; first match wins.
        let names: Vec<&str> = TOPIC_RULES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "weather",
                "finance",
                "sports",
                "technology",
                "science",
                "history",
                "geography",
                "news"
            ]
        );
    }

    #[test]
    fn test_word_boundaries() {
        // "nowhere" must not count as "now"
        assert!(!TEMPORAL_KEYWORDS[1].is_match("nowhere to be found"));
        assert!(TEMPORAL_KEYWORDS[1].is_match("right now"));
    }
}
