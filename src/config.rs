use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Static champion roster: `(display name, canonical URL slug)`.
/// Used to notice champions the tier list forgot.
pub const CHAMPION_ROSTER: &[(&str, &str)] = &[
    ("Aatrox", "aatrox"), ("Ahri", "ahri"), ("Akali", "akali"), ("Akshan", "akshan"),
    ("Alistar", "alistar"), ("Ambessa", "ambessa"), ("Amumu", "amumu"), ("Annie", "annie"),
    ("Ashe", "ashe"), ("Aurelion Sol", "aurelion-sol"), ("Aurora", "aurora"), ("Bard", "bard"),
    ("Blitzcrank", "blitzcrank"), ("Brand", "brand"), ("Braum", "braum"),
    ("Caitlyn", "caitlyn"), ("Camille", "camille"), ("Corki", "corki"), ("Darius", "darius"),
    ("Diana", "diana"), ("Dr. Mundo", "dr-mundo"), ("Draven", "draven"), ("Ekko", "ekko"),
    ("Evelynn", "evelynn"), ("Ezreal", "ezreal"), ("Fiddlesticks", "fiddlesticks"),
    ("Fiora", "fiora"), ("Fizz", "fizz"), ("Galio", "galio"), ("Garen", "garen"),
    ("Gnar", "gnar"), ("Gragas", "gragas"), ("Graves", "graves"), ("Gwen", "gwen"),
    ("Hecarim", "hecarim"), ("Heimerdinger", "heimerdinger"), ("Irelia", "irelia"),
    ("Janna", "janna"), ("Jarvan IV", "jarvan-iv"), ("Jax", "jax"), ("Jayce", "jayce"),
    ("Jhin", "jhin"), ("Jinx", "jinx"), ("Kai'Sa", "kaisa"), ("Kalista", "kalista"),
    ("Karma", "karma"), ("Kassadin", "kassadin"), ("Katarina", "katarina"), ("Kayle", "kayle"),
    ("Kayn", "kayn"), ("Kennen", "kennen"), ("Kha'Zix", "khazix"), ("Kindred", "kindred"),
    ("Kog'Maw", "kogmaw"), ("Lee Sin", "lee-sin"), ("Leona", "leona"), ("Lillia", "lillia"),
    ("Lissandra", "lissandra"), ("Lucian", "lucian"), ("Lulu", "lulu"), ("Lux", "lux"),
    ("Malphite", "malphite"), ("Maokai", "maokai"), ("Master Yi", "master-yi"),
    ("Milio", "milio"), ("Miss Fortune", "miss-fortune"), ("Mordekaiser", "mordekaiser"),
    ("Morgana", "morgana"), ("Nami", "nami"), ("Nasus", "nasus"), ("Nautilus", "nautilus"),
    ("Nidalee", "nidalee"), ("Nilah", "nilah"), ("Nocturne", "nocturne"), ("Norra", "norra"),
    ("Nunu & Willump", "nunu-willump"), ("Olaf", "olaf"), ("Orianna", "orianna"),
    ("Ornn", "ornn"), ("Pantheon", "pantheon"), ("Poppy", "poppy"), ("Pyke", "pyke"),
    ("Rakan", "rakan"), ("Rammus", "rammus"), ("Rell", "rell"), ("Renekton", "renekton"),
    ("Rengar", "rengar"), ("Riven", "riven"), ("Rumble", "rumble"), ("Ryze", "ryze"),
    ("Samira", "samira"), ("Senna", "senna"), ("Seraphine", "seraphine"), ("Sett", "sett"),
    ("Shen", "shen"), ("Shyvana", "shyvana"), ("Singed", "singed"), ("Sion", "sion"),
    ("Sivir", "sivir"), ("Smolder", "smolder"), ("Sona", "sona"), ("Soraka", "soraka"),
    ("Swain", "swain"), ("Syndra", "syndra"), ("Talon", "talon"), ("Teemo", "teemo"),
    ("Thresh", "thresh"), ("Tristana", "tristana"), ("Tryndamere", "tryndamere"),
    ("Twisted Fate", "twisted-fate"), ("Twitch", "twitch"), ("Urgot", "urgot"),
    ("Varus", "varus"), ("Vayne", "vayne"), ("Veigar", "veigar"), ("Vel'Koz", "velkoz"),
    ("Vex", "vex"), ("Vi", "vi"), ("Viego", "viego"), ("Viktor", "viktor"),
    ("Vladimir", "vladimir"), ("Volibear", "volibear"), ("Warwick", "warwick"),
    ("Wukong", "wukong"), ("Xayah", "xayah"), ("Xin Zhao", "xin-zhao"), ("Yasuo", "yasuo"),
    ("Yone", "yone"), ("Yuumi", "yuumi"), ("Zed", "zed"), ("Zeri", "zeri"), ("Ziggs", "ziggs"),
    ("Zilean", "zilean"), ("Zoe", "zoe"), ("Zyra", "zyra"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub slug: String,
}

impl RosterEntry {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }
}

pub fn default_roster() -> Vec<RosterEntry> {
    CHAMPION_ROSTER
        .iter()
        .map(|(name, slug)| RosterEntry::new(name, slug))
        .collect()
}

/// Every tuning knob of a sync run.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub tier_list_url: String,
    pub user_agent: String,
    pub chrome_path: Option<PathBuf>,
    /// Navigation timeout per page.
    pub timeout: Duration,
    /// Pause after clicking a role tab.
    pub settle_delay: Duration,
    /// Pause between two detail pages.
    pub request_delay: Duration,
    pub retry: RetryPolicy,
    pub expected_champions: usize,
    pub output_dir: PathBuf,
    pub job_status_url: Option<String>,
    pub roster: Vec<RosterEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://wr-meta.com".to_string(),
            tier_list_url: "https://wr-meta.com/meta/".to_string(),
            user_agent: "WildRiftDraftAssistant/1.0 (research-tool)".to_string(),
            chrome_path: None,
            timeout: Duration::from_millis(30_000),
            settle_delay: Duration::from_millis(2_500),
            request_delay: Duration::from_millis(1_500),
            retry: RetryPolicy::new(3, Duration::from_millis(2_000)),
            expected_champions: 135,
            output_dir: PathBuf::from("output"),
            job_status_url: None,
            roster: default_roster(),
        }
    }
}

impl Config {
    /// Read overrides from the environment (call `dotenv().ok()` first).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("WR_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            tier_list_url: env::var("WR_TIER_LIST_URL").unwrap_or(defaults.tier_list_url),
            user_agent: env::var("WR_USER_AGENT").unwrap_or(defaults.user_agent),
            chrome_path: env::var("CHROME_PATH").ok().map(PathBuf::from),
            timeout: env_millis("WR_TIMEOUT_MS").unwrap_or(defaults.timeout),
            settle_delay: env_millis("WR_SETTLE_MS").unwrap_or(defaults.settle_delay),
            request_delay: env_millis("WR_REQUEST_DELAY_MS").unwrap_or(defaults.request_delay),
            retry: RetryPolicy::new(
                env_parse("WR_MAX_RETRIES").unwrap_or(defaults.retry.max_attempts),
                env_millis("WR_RETRY_BASE_DELAY_MS").unwrap_or(defaults.retry.base_delay),
            ),
            expected_champions: env_parse("WR_EXPECTED_CHAMPIONS")
                .unwrap_or(defaults.expected_champions),
            output_dir: env::var("WR_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            job_status_url: env::var("JOB_STATUS_URL").ok().filter(|u| !u.is_empty()),
            roster: defaults.roster,
        }
    }

    /// Artifact written by full runs; also what the incremental cache reads.
    pub fn full_artifact_path(&self) -> PathBuf {
        self.output_dir.join("raw-data.json")
    }

    pub fn sample_artifact_path(&self) -> PathBuf {
        self.output_dir.join("raw-sample.json")
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = raw.as_str(), "ignoring unparseable setting");
            None
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_millis)
}
