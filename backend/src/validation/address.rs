//! Street-address grammar.
//!
//! An address is accepted when it names a known highway/county-road
//! convention, or when it reads as house number + street name + suffix with
//! at most a directional (or, for road-family suffixes, a route designator)
//! after the suffix. PO boxes and rural-route boxes are reported or exempted
//! before the grammar runs.
//!
//! ```text
//! "123 Main St"        -> Street { ending: "St", extra: "" }
//! "55 Oak Ave NW"      -> Street { ending: "Ave", extra: "NW" }
//! "9 County Road 12"   -> SpecificRoad
//! "Main St"            -> MissingHouseNumber { ending: "St" }
//! "12 Elm St Apt 4"    -> NonStandardExtra { ending: "St", extra: "Apt 4" }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::reference::VALID_STATES;

// =============================================================================
// Pattern Catalog
// =============================================================================

/// Multi-word suffixes. Any of these beats a single-word suffix.
const MULTI_WORD_ENDINGS: &[&str] = &[
    r"US Highway",
    r"US Hwy",
    r"Private Road",
    r"County Road",
    r"County Rd",
    r"Co Rd",
    r"State Route",
    r"Farm to Market",
    r"County Hwy \d+",
    r"County FM \d+",
    r"FM Road \d+",
    r"Fire District \d+ Rd",
    r"State Hwy \d+",
    r"Kamehameha Hwy",
    r"Mamalahoa Hwy",
    r"Route C-\d+",
    r"Route [A-Z]{2}",
    r"[A-Z]{2} Road",
    r"RS \d+",
    r"KY RS \d+",
];

/// Single-word suffixes, including numbered state-route tokens.
const SINGLE_WORD_ENDINGS: &[&str] = &[
    r"Alley", r"ALY", r"Avenue", r"Ave", r"Av", r"Boulevard", r"Blvd", r"Circle", r"Cir", r"Cr",
    r"Court", r"Ct", r"Drive", r"Dr", r"Expressway", r"Expy", r"FM", r"Highway", r"Hwy",
    r"Lane", r"Ln", r"Loop", r"Parkway", r"Pkwy", r"Place", r"Pl", r"Road", r"Rd", r"Route",
    r"Rte", r"Rt", r"Square", r"Sq", r"Street", r"St", r"Terrace", r"Ter", r"Trail", r"Trl",
    r"Turnpike", r"Tpke", r"Way", r"Wy", r"CR", r"SR", r"US", r"Interstate", r"I-",
    r"AZ-\d+", r"CA-\d+", r"CT-\d+", r"DE-\d+", r"FL-\d+", r"GA-\d+", r"ID-\d+",
    r"IL-\d+", r"IN-\d+", r"K-\d+", r"ME-\d+", r"MD-\d+", r"MA-\d+", r"M-\d+",
    r"MN-\d+", r"MS-\d+", r"NH-\d+", r"NJ-\d+", r"NM-\d+", r"NY-\d+", r"NC-\d+",
    r"OH-\d+", r"OK-\d+", r"OR-\d+", r"PA-\d+", r"RI-\d+", r"SC-\d+", r"TN-\d+",
    r"UT-\d+", r"VT-\d+", r"VA-\d+", r"WA-\d+", r"WV-\d+", r"WI-\d+", r"WY-\d+",
    r"SH-\d+", r"C-\d+", r"Carr \d+", r"Route \d+", r"CH \d+",
];

/// Suffixes (lowercased) that accept a route designator after them.
const SPECIAL_ENDINGS: &[&str] = &[
    "highway", "hwy", "county road", "county rd", "co rd", "state route", "sr", "interstate",
    "i-", "farm to market", "farm road", "fm", "us", "us hwy", "pvt", "private road",
    "county hwy", "ch", "county fm", "fm road", "fire district", "road", "rd", "route c-", "c-",
    "route", "rs", "ky rs", "state hwy", "az-", "ca-", "ct-", "de-", "fl-", "ga-", "id-", "il-",
    "in-", "k-", "me-", "md-", "ma-", "m-", "mn-", "ms-", "nh-", "nj-", "nm-", "ny-", "nc-",
    "oh-", "ok-", "or-", "pa-", "ri-", "sc-", "tn-", "ut-", "vt-", "va-", "wa-", "wv-", "wi-",
    "wy-", "sh-", "carr", "pr", "cr",
];

/// Numbered special suffixes, matched by prefix.
const SPECIAL_ENDING_PREFIXES: &[&str] = &[
    "route ",
    "county hwy ",
    "county fm ",
    "fm road ",
    "fire district ",
    "state hwy ",
    "ky rs ",
];

const STATE_NAMES: &[&str] = &[
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado", "Connecticut",
    "Delaware", "Florida", "Georgia", "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa", "Kansas",
    "Kentucky", "Louisiana", "Maine", "Maryland", "Massachusetts", "Michigan", "Minnesota",
    "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada", r"New\sHampshire",
    r"New\sJersey", r"New\sMexico", r"New\sYork", r"North\sCarolina", r"North\sDakota", "Ohio",
    "Oklahoma", "Oregon", "Pennsylvania", r"Rhode\sIsland", r"South\sCarolina",
    r"South\sDakota", "Tennessee", "Texas", "Utah", "Vermont", "Virginia", "Washington",
    r"West\sVirginia", "Wisconsin", "Wyoming", r"District\sof\sColumbia", r"Puerto\sRico",
    r"Virgin\sIslands", "Guam", r"American\sSamoa", r"Northern\sMariana\sIslands",
];

const DIRECTIONS: &str =
    "N|S|E|W|NE|NW|SE|SW|North|South|East|West|Northeast|Northwest|Southeast|Southwest";

/// Characters that may not appear anywhere in an address.
pub const FORBIDDEN_CHARS: &str = "!@#$%^&*()+={}[]|\"'?/:;<,>";

// =============================================================================
// Compiled Patterns
// =============================================================================

fn ending_tier(alternatives: &[&str]) -> Regex {
    let body: Vec<String> = alternatives.iter().map(|a| format!(r"\b{a}\b")).collect();
    Regex::new(&format!(r"(?i)\s+({})\.?", body.join("|"))).expect("valid ending pattern")
}

static MULTI_WORD: Lazy<Regex> = Lazy::new(|| ending_tier(MULTI_WORD_ENDINGS));

static SINGLE_WORD: Lazy<Regex> = Lazy::new(|| ending_tier(SINGLE_WORD_ENDINGS));

static SPECIFIC_ROAD: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)(?:\d+\s+)?(?:County\s*(?:Road|Rd|CR)|Private\s*Road|Us\s*Hwy|Farm\s*to\s*Market|Farm\s*Road|Farm\s*to\s*Market\s*Road|FM\s*Rd|State\s*(?:Road|Rd|Route)|Old\s*State\s*(?:Road|Rd)|(?:{states})-\d+|(?:{names})\s*(?:Hwy|Highway|Route|Rte|Rt)\s*\d+)\s*(?:\d+(?:\s*(?:{dirs}))?)?\b",
        states = VALID_STATES.join("|"),
        names = STATE_NAMES.join("|"),
        dirs = "North|South|East|West|Northeast|Northwest|Southeast|Southwest|N|S|E|W|NE|NW|SE|SW",
    );
    Regex::new(&pattern).expect("valid specific road pattern")
});

static PO_BOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bPO Box\b|\bP\.O\. Box\b|\bPost Office Box\b").expect("valid PO box pattern")
});

static RURAL_ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bRR \d+ Box \d+\b|\bRural Route \d+ Box \d+\b|\bR\.R\. \d+ Box \d+\b|\bHC \d+ Box \d+\b",
    )
    .expect("valid rural route pattern")
});

static VOID_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)void\s+_(upload|Diamond)").expect("valid void pattern"));

static HOUSE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d").expect("valid house number pattern"));

static DIRECTIONAL_EXTRA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^(?:{DIRECTIONS}|(?:N|S|E|W)\s+(?:N|S|E|W))$"))
        .expect("valid directional pattern")
});

static ROUTE_EXTRA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:[0-9]+(?:\s+(?:{DIRECTIONS}))?|[A-Za-z0-9\-]+(?:\s+(?:{DIRECTIONS}))?|[A-Za-z0-9\-]+[NSEW]{{1,2}}|(?:Avenue|Ave|Av|Boulevard|Blvd|Circle|Cir|Cr|Court|Ct|Drive|Dr|Expressway|Expy|Highway|Hwy|Lane|Ln|Parkway|Pkwy|Place|Pl|Road|Rd|Square|Sq|Street|St|Terrace|Ter|Trail|Trl|Way|Wy|CR|SR|FM|US|Interstate|I-))$"
    ))
    .expect("valid route designator pattern")
});

// =============================================================================
// Detectors
// =============================================================================

pub fn is_po_box(address: &str) -> bool {
    PO_BOX.is_match(address)
}

pub fn is_rural_route(address: &str) -> bool {
    RURAL_ROUTE.is_match(address)
}

pub fn is_specific_road(address: &str) -> bool {
    SPECIFIC_ROAD.is_match(address)
}

pub fn has_void_code(address: &str) -> bool {
    VOID_CODE.is_match(address)
}

/// First forbidden character in the address, if any.
pub fn forbidden_char(address: &str) -> Option<char> {
    address.chars().find(|c| FORBIDDEN_CHARS.contains(*c))
}

/// Whether a suffix accepts a route designator (numbers, codes) after it.
pub fn is_special_ending(ending: &str) -> bool {
    let lower = ending.to_lowercase();
    SPECIAL_ENDINGS.contains(&lower.as_str())
        || SPECIAL_ENDING_PREFIXES.iter().any(|p| lower.starts_with(p))
}

// =============================================================================
// Grammar
// =============================================================================

/// Outcome of matching one address against the street grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarOutcome {
    /// Matches a highway/county-road convention; no further checks.
    SpecificRoad,
    /// House number, suffix and an acceptable qualifier.
    Street { ending: String, extra: String },
    /// No suffix token anywhere.
    NoEnding,
    /// Suffix found but the text before it does not start with a digit.
    MissingHouseNumber { ending: String },
    /// Something other than an accepted qualifier trails the suffix.
    NonStandardExtra { ending: String, extra: String },
}

impl GrammarOutcome {
    /// Finding message for a failed match.
    pub fn message(&self) -> Option<String> {
        match self {
            GrammarOutcome::SpecificRoad | GrammarOutcome::Street { .. } => None,
            GrammarOutcome::NoEnding => {
                Some("Address does not match expected road or street format".to_string())
            }
            GrammarOutcome::MissingHouseNumber { ending } => Some(format!(
                "Address must include a house number before ending: {ending}"
            )),
            GrammarOutcome::NonStandardExtra { extra, .. } => Some(format!(
                "Address may contain non-standard components after ending: {extra}"
            )),
        }
    }
}

/// A located street suffix.
struct EndingMatch<'a> {
    /// Text before the whitespace that precedes the suffix
    head: &'a str,
    ending: &'a str,
    /// Trimmed text after the suffix and its optional period
    extra: &'a str,
}

/// Right-most suffix of one tier.
fn rightmost_ending<'a>(tier: &Regex, address: &'a str) -> Option<EndingMatch<'a>> {
    let caps = tier.captures_iter(address).last()?;
    let whole = caps.get(0)?;
    let ending = caps.get(1)?;
    Some(EndingMatch {
        head: &address[..whole.start()],
        ending: ending.as_str(),
        extra: address[whole.end()..].trim(),
    })
}

/// Locate the suffix: multi-word endings first, then single-word ones.
fn find_ending(address: &str) -> Option<EndingMatch<'_>> {
    rightmost_ending(&MULTI_WORD, address).or_else(|| rightmost_ending(&SINGLE_WORD, address))
}

fn qualifier_accepted(ending: &str, extra: &str) -> bool {
    if extra.is_empty() {
        return true;
    }
    if is_special_ending(ending) {
        ROUTE_EXTRA.is_match(extra)
    } else {
        DIRECTIONAL_EXTRA.is_match(extra)
    }
}

/// Match a trimmed address against the street grammar.
pub fn match_grammar(address: &str) -> GrammarOutcome {
    if is_specific_road(address) {
        return GrammarOutcome::SpecificRoad;
    }

    let Some(found) = find_ending(address) else {
        return GrammarOutcome::NoEnding;
    };

    let ending = found.ending.to_string();
    if !HOUSE_NUMBER.is_match(found.head.trim()) {
        return GrammarOutcome::MissingHouseNumber { ending };
    }

    let extra = found.extra.to_string();
    if qualifier_accepted(&ending, &extra) {
        GrammarOutcome::Street { ending, extra }
    } else {
        GrammarOutcome::NonStandardExtra { ending, extra }
    }
}

/// Every address finding for a non-blank, trimmed address, in check order.
///
/// PO boxes and rural-route boxes skip the grammar; rural routes are still
/// checked for forbidden characters, once.
pub fn check_address(address: &str) -> Vec<String> {
    let mut messages = Vec::new();

    let po_box = is_po_box(address);
    if po_box {
        messages
            .push("Address must be a physical address, PO Boxes are not allowed".to_string());
    }

    let rural_route = is_rural_route(address);
    if let Some(c) = forbidden_char(address) {
        messages.push(format!("Address contains forbidden character: {c}"));
    }

    if has_void_code(address) {
        messages.push("Contains invalid void/_Diamond code block".to_string());
    }

    if po_box || rural_route {
        return messages;
    }

    if let Some(message) = match_grammar(address).message() {
        messages.push(message);
    }
    messages
}

// =============================================================================
// Tests
// =============================================================================
