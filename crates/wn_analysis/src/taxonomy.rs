//! Fixed taxonomies used by the classifiers.
//!
//! Each table is a single read-only data asset. Lookup structures derived from
//! them are built lazily on first use and shared process-wide.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Language codes (ISO 639-1/2/3 and common variants) to display names.
pub const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"), ("eng", "English"),
    ("sv", "Swedish"), ("swe", "Swedish"),
    ("fr", "French"), ("fra", "French"),
    ("es", "Spanish"), ("spa", "Spanish"),
    ("de", "German"), ("ger", "German"), ("deu", "German"),
    ("pt", "Portuguese"), ("por", "Portuguese"), ("pt-br", "Portuguese (Brazil)"),
    ("ru", "Russian"), ("rus", "Russian"),
    ("zh", "Chinese"), ("zho", "Chinese"), ("cn", "Chinese"),
    ("ar", "Arabic"), ("ara", "Arabic"),
    ("tr", "Turkish"), ("tur", "Turkish"),
    ("it", "Italian"), ("ita", "Italian"),
    ("pl", "Polish"), ("pol", "Polish"),
    ("nl", "Dutch"), ("nld", "Dutch"), ("dut", "Dutch"),
    ("da", "Danish"), ("dan", "Danish"),
    ("fi", "Finnish"), ("fin", "Finnish"),
    ("no", "Norwegian"), ("nor", "Norwegian"), ("nb", "Norwegian"),
    ("uk", "Ukrainian"), ("ukr", "Ukrainian"),
    ("cs", "Czech"), ("cze", "Czech"), ("ces", "Czech"),
    ("ja", "Japanese"), ("jpn", "Japanese"),
    ("ko", "Korean"), ("kor", "Korean"),
    ("el", "Greek"), ("ell", "Greek"),
    ("he", "Hebrew"), ("heb", "Hebrew"),
    ("id", "Indonesian"), ("ind", "Indonesian"),
    ("ms", "Malay"), ("msa", "Malay"),
    ("hi", "Hindi"), ("hin", "Hindi"),
    ("bn", "Bengali"), ("ben", "Bengali"),
    ("vi", "Vietnamese"), ("vie", "Vietnamese"),
    ("th", "Thai"), ("tha", "Thai"),
];

/// Canonical categories and their keyword signals, in classification order.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("business", &[
        "business", "company", "companies", "market", "markets", "stock", "stocks", "equity",
        "share price", "ipo", "earnings", "revenue", "profit", "loss", "merger", "acquisition",
        "m&a", "takeover", "startup", "start-up", "venture", "ceo", "executive", "layoff",
        "investment", "investor", "funding", "valuation", "private equity", "deal",
    ]),
    ("economy", &[
        "economy", "economic", "macro", "inflation", "gdp", "interest rate", "interest rates",
        "central bank", "federal reserve", "ecb", "boe", "boj", "unemployment", "jobs report",
        "labor market", "recession", "growth", "fiscal policy", "deficit", "trade balance",
        "cpi", "pce", "bond yield", "treasury", "monetary policy",
    ]),
    ("science", &[
        "research", "study", "studies", "experiment", "experiments", "discovery", "discoveries",
        "peer review", "journal", "scientist", "laboratory", "lab", "academic", "evidence",
    ]),
    ("space", &[
        "space", "nasa", "spacex", "satellite", "satellites", "rocket", "launch", "astronomy",
        "planet", "planets", "mission", "iss", "orbit", "telescope", "moon", "mars", "lunar",
        "cosmos", "spacecraft",
    ]),
    ("environment_climate", &[
        "climate change", "emission", "emissions", "sustainability", "energy transition",
        "renewable", "renewables", "solar", "wind", "greenhouse", "carbon", "net zero",
        "wildfire", "heatwave", "flood", "drought", "hurricane", "storm", "weather event",
        "environment", "pollution", "methane", "sea level", "biodiversity",
    ]),
    ("society", &[
        "society", "social", "migration", "immigration", "refugee", "refugees", "education",
        "school", "university", "culture", "cultural", "demographic", "demographics",
        "inequality", "poverty", "community", "housing", "crime", "justice",
    ]),
    ("technology", &[
        "technology", "tech", "ai", "artificial intelligence", "software", "hardware", "chip",
        "semiconductor", "device", "gadget", "cloud", "data center", "cyber", "security",
        "cybersecurity", "machine learning", "automation",
    ]),
    ("politics", &[
        "politic", "politics", "election", "elections", "government", "president", "parliament",
        "congress", "minister", "policy", "regulation", "diplomat", "diplomacy", "vote",
        "voting", "campaign", "senate",
    ]),
    ("sports", &[
        "sport", "sports", "football", "soccer", "nba", "fifa", "olympic", "tennis", "golf",
        "cricket", "baseball", "basketball", "tournament", "match", "game", "league", "cup",
    ]),
    ("health", &[
        "health", "covid", "virus", "vaccine", "hospital", "medicine", "medical", "doctor",
        "nurse", "disease", "outbreak", "pandemic", "pharma", "drug", "clinical trial",
        "mental health", "public health",
    ]),
];

/// Provider topic strings mapped straight onto a canonical category.
pub const TOPIC_ALIASES: &[(&str, &str)] = &[
    ("environment & climate", "environment_climate"),
    ("environment and climate", "environment_climate"),
    ("environment", "environment_climate"),
    ("climate", "environment_climate"),
];

/// Narrative frames and the phrases that signal them.
pub const FRAME_GROUPS: &[(&str, &[&str])] = &[
    ("Conflict & War", &[
        "war", "armed conflict", "military conflict", "battle", "combat",
        "offensive", "counteroffensive", "troops", "military deployment",
        "frontline", "airstrike", "missile strike", "shelling",
        "invasion", "occupation",
    ]),
    ("Terrorism & Security", &[
        "terrorist attack", "terrorism", "extremist group", "militant",
        "insurgent", "suicide bombing", "mass shooting",
        "security forces", "counterterrorism", "homeland security",
        "radicalization",
    ]),
    ("Sanctions & Pressure", &[
        "economic sanctions", "trade sanctions", "financial sanctions",
        "embargo", "asset freeze", "travel ban", "export controls",
        "blacklist", "secondary sanctions", "boycott",
    ]),
    ("Humanitarian Impact", &[
        "humanitarian crisis", "civilian casualties", "civilian deaths",
        "refugees", "internally displaced", "displacement",
        "humanitarian aid", "aid delivery", "evacuation",
        "famine", "food insecurity", "medical supplies",
    ]),
    ("Technology", &[
        "artificial intelligence", "machine learning", "AI model",
        "large language model", "software system",
        "cyberattack", "cyber warfare", "cybersecurity breach",
        "data breach", "semiconductor", "chip manufacturing",
        "surveillance technology",
    ]),
    ("Climate & Environment", &[
        "climate change", "global warming", "greenhouse gas",
        "greenhouse gases", "carbon emissions", "CO2 emissions",
        "net zero", "renewable energy", "energy transition",
        "fossil fuels", "pollution", "environmental damage",
        "climate policy",
    ]),
];

lazy_static! {
    pub static ref LANGUAGE_LOOKUP: HashMap<&'static str, &'static str> =
        LANGUAGE_NAMES.iter().copied().collect();

    pub static ref ALIAS_LOOKUP: HashMap<&'static str, &'static str> =
        TOPIC_ALIASES.iter().copied().collect();

    pub static ref CANONICAL_CATEGORIES: HashSet<&'static str> =
        CATEGORY_KEYWORDS.iter().map(|(name, _)| *name).collect();

    /// One case-insensitive, word-bounded alternation per frame.
    pub static ref FRAME_PATTERNS: Vec<(&'static str, Regex)> = FRAME_GROUPS
        .iter()
        .map(|(frame, phrases)| {
            let alternation = phrases
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
                .expect("frame phrases are escaped literals");
            (*frame, pattern)
        })
        .collect();
}

/// Forces every lazily built lookup so the first request does not pay for it.
pub fn warm_up() {
    lazy_static::initialize(&LANGUAGE_LOOKUP);
    lazy_static::initialize(&ALIAS_LOOKUP);
    lazy_static::initialize(&CANONICAL_CATEGORIES);
    lazy_static::initialize(&FRAME_PATTERNS);
}

pub fn frame_names() -> impl Iterator<Item = &'static str> {
    FRAME_GROUPS.iter().map(|(name, _)| *name)
}

pub fn category_names() -> impl Iterator<Item = &'static str> {
    CATEGORY_KEYWORDS.iter().map(|(name, _)| *name)
}
