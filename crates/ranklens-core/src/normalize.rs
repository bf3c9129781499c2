//! Keyword repair.
//!
//! Provider keyword strings sometimes arrive contaminated with internal
//! bookkeeping: ID prefixes like `001-qk7yulqsx9-3342555957`, stray numeric
//! codes glued to either end, or rows that are nothing but digits. The
//! repair rules below strip that debris before a keyword is stored,
//! displayed, or used as a dedupe key.
//!
//! Rules run in a fixed order, each on the output of the previous. The
//! full pipeline is idempotent: rules that strip a prefix or suffix run to
//! a fixed point, so normalizing an already-normalized string is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading provider artifact: short numeric code, opaque token, long
/// numeric suffix, e.g. `001-qk7yulqsx9-3342555957`.
static ID_ARTIFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}-[A-Za-z0-9]+-\d{4,}(\s+|$)").unwrap());

/// Short numeric code directly before a word (Latin or CJK letter).
static CODE_BEFORE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3})\s+(\p{L}.*)$").unwrap());

/// Any leading digit run followed by whitespace.
static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s+").unwrap());

/// Nothing but digits.
static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Trailing short numeric code preceded by whitespace.
static TRAILING_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\d{1,3}$").unwrap());

/// One named repair step.
pub struct RepairRule {
    pub name: &'static str,
    run: fn(&str) -> String,
}

impl RepairRule {
    pub fn apply(&self, input: &str) -> String {
        (self.run)(input)
    }
}

/// The repair pipeline, in application order.
pub const REPAIR_RULES: [RepairRule; 7] = [
    RepairRule {
        name: "trim",
        run: trim,
    },
    RepairRule {
        name: "strip-id-artifact",
        run: strip_id_artifacts,
    },
    RepairRule {
        name: "strip-code-before-word",
        run: strip_code_before_word,
    },
    RepairRule {
        name: "strip-leading-digits",
        run: strip_leading_digits,
    },
    RepairRule {
        name: "reject-numeric-only",
        run: reject_numeric_only,
    },
    RepairRule {
        name: "strip-trailing-code",
        run: strip_trailing_codes,
    },
    RepairRule {
        name: "trim",
        run: trim,
    },
];

/// Run every repair rule over `raw` and return the cleaned string.
///
/// The rule chain repeats until the string stops changing: stripping a
/// leading code can expose a new artifact underneath, and a second pass
/// must repair it too or normalization would not be idempotent. Each pass
/// only ever removes characters, so the loop terminates.
///
/// An empty return means the keyword was irreparable. Most callers want
/// [`clean_keyword`], which folds that case into `None`.
pub fn normalize(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = REPAIR_RULES
            .iter()
            .fold(current.clone(), |acc, rule| rule.apply(&acc));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Normalize `raw`, rejecting keywords that come out empty or purely
/// numeric. Callers drop the corresponding record rather than store it.
pub fn clean_keyword(raw: &str) -> Option<String> {
    let cleaned = normalize(raw);
    if cleaned.is_empty() || ALL_DIGITS.is_match(&cleaned) {
        None
    } else {
        Some(cleaned)
    }
}

fn trim(input: &str) -> String {
    input.trim().to_string()
}

fn strip_id_artifacts(input: &str) -> String {
    strip_prefix_to_fixed_point(input, &ID_ARTIFACT)
}

fn strip_code_before_word(input: &str) -> String {
    let mut current = input.to_string();
    while let Some(caps) = CODE_BEFORE_WORD.captures(&current) {
        current = caps[2].to_string();
    }
    current
}

fn strip_leading_digits(input: &str) -> String {
    strip_prefix_to_fixed_point(input, &LEADING_DIGITS)
}

fn reject_numeric_only(input: &str) -> String {
    if ALL_DIGITS.is_match(input) {
        String::new()
    } else {
        input.to_string()
    }
}

fn strip_trailing_codes(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let stripped = TRAILING_CODE.replace(&current, "");
        if stripped == current {
            return current;
        }
        current = stripped.into_owned();
    }
}

fn strip_prefix_to_fixed_point(input: &str, pattern: &Regex) -> String {
    let mut current = input.to_string();
    loop {
        let stripped = pattern.replace(&current, "");
        if stripped == current {
            return current;
        }
        current = stripped.into_owned();
    }
}
