//! Premier League match logs from fbref.com.
//!
//! Walks the league standings season by season, then pulls each squad's
//! "Scores & Fixtures" log and its all-competitions shooting log and joins the
//! two on match date. Only the page fetches touch the network; everything else
//! is plain HTML parsing so it can be tested against saved pages.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::config::Settings;
use crate::http_cache::{PAGE_RETAIN_FOR, PageCache, fetch_page_cached};
use crate::http_client::http_client;

pub const FBREF_BASE_URL: &str = "https://fbref.com";
pub const PREMIER_LEAGUE_STATS_PATH: &str = "/en/comps/9/stats/Premier-League-Stats";
pub const PREMIER_LEAGUE: &str = "Premier League";

const FIXTURES_CAPTION: &str = "Scores & Fixtures";
const SHOOTING_CAPTION: &str = "Shooting";
const SHOOTING_LINK_MARKER: &str = "all_comps/shooting/";

/// Pages fetched within this window are served from the page cache.
const PAGE_FRESH_FOR: Duration = Duration::from_secs(6 * 60 * 60);

/// One merged row, in the column layout the match store reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedMatch {
    pub date: String,
    pub time: String,
    pub comp: String,
    pub round: String,
    pub day: String,
    pub venue: String,
    pub result: String,
    pub gf: String,
    pub ga: String,
    pub opponent: String,
    pub sh: String,
    pub sot: String,
    pub dist: String,
    pub fk: String,
    pub pk: String,
    pub pkatt: String,
    pub season: i32,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsPage {
    pub team_urls: Vec<String>,
    pub prev_season_url: Option<String>,
}

/// One table row keyed by the cells' `data-stat` attribute.
pub type StatRow = HashMap<String, String>;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{base}{href}")
    }
}

/// Squad links from the first standings table plus the previous-season link.
pub fn parse_standings(html: &str, base: &str) -> Result<StandingsPage> {
    let doc = Html::parse_document(html);
    let table_sel = selector("table.stats_table")?;
    let link_sel = selector("a")?;
    let prev_sel = selector("a.prev")?;

    let table = doc
        .select(&table_sel)
        .next()
        .context("standings page has no stats table")?;

    let mut seen = HashSet::new();
    let mut team_urls = Vec::new();
    for link in table.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if href.contains("/squads/") && seen.insert(href.to_string()) {
            team_urls.push(absolute_url(base, href));
        }
    }

    let prev_season_url = doc
        .select(&prev_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolute_url(base, href));

    Ok(StandingsPage {
        team_urls,
        prev_season_url,
    })
}

/// "…/squads/b8fd03ef/Manchester-United-Stats" → "Manchester United".
pub fn team_name_from_url(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    last.replace("-Stats", "").replace('-', " ")
}

/// Rows of the first table whose caption mentions `caption`. Header and spacer
/// rows, and rows without a date, are skipped.
pub fn parse_match_log(html: &str, caption: &str) -> Result<Vec<StatRow>> {
    let doc = Html::parse_document(html);
    let table_sel = selector("table")?;
    let caption_sel = selector("caption")?;
    let row_sel = selector("tbody tr")?;
    let cell_sel = selector("th, td")?;

    let table = doc
        .select(&table_sel)
        .find(|t| {
            t.select(&caption_sel)
                .next()
                .is_some_and(|c| element_text(c).contains(caption))
        })
        .with_context(|| format!("no table captioned {caption:?}"))?;

    let mut rows = Vec::new();
    for tr in table.select(&row_sel) {
        if tr
            .value()
            .attr("class")
            .is_some_and(|c| c.contains("thead") || c.contains("spacer"))
        {
            continue;
        }
        let mut cells = StatRow::new();
        for cell in tr.select(&cell_sel) {
            if let Some(stat) = cell.value().attr("data-stat") {
                cells.insert(stat.to_string(), element_text(cell));
            }
        }
        if cells.get("date").is_some_and(|d| !d.is_empty()) {
            rows.push(cells);
        }
    }
    Ok(rows)
}

pub fn find_shooting_link(html: &str, base: &str) -> Result<Option<String>> {
    let doc = Html::parse_document(html);
    let link_sel = selector("a[href]")?;
    Ok(doc
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(SHOOTING_LINK_MARKER))
        .map(|href| absolute_url(base, href)))
}

/// Inner-joins fixtures with shooting rows on date and keeps league matches.
/// The first shooting row wins when a date repeats.
pub fn merge_team_logs(
    fixtures: &[StatRow],
    shooting: &[StatRow],
    team: &str,
    season: i32,
) -> Vec<ScrapedMatch> {
    let mut shooting_by_date: HashMap<&str, &StatRow> = HashMap::new();
    for row in shooting {
        if let Some(date) = row.get("date") {
            shooting_by_date.entry(date.as_str()).or_insert(row);
        }
    }

    let field = |row: &StatRow, key: &str| row.get(key).cloned().unwrap_or_default();
    let mut seen_dates = HashSet::new();
    let mut out = Vec::new();
    for fx in fixtures {
        let date = field(fx, "date");
        if field(fx, "comp") != PREMIER_LEAGUE || !seen_dates.insert(date.clone()) {
            continue;
        }
        let Some(sh) = shooting_by_date.get(date.as_str()) else {
            continue;
        };
        out.push(ScrapedMatch {
            time: field(fx, "start_time"),
            comp: field(fx, "comp"),
            round: field(fx, "round"),
            day: field(fx, "dayofweek"),
            venue: field(fx, "venue"),
            result: field(fx, "result"),
            gf: field(fx, "goals_for"),
            ga: field(fx, "goals_against"),
            opponent: field(fx, "opponent"),
            sh: field(sh, "shots"),
            sot: field(sh, "shots_on_target"),
            dist: field(sh, "average_shot_distance"),
            fk: field(sh, "shots_free_kicks"),
            pk: field(sh, "pens_made"),
            pkatt: field(sh, "pens_att"),
            season,
            team: team.to_string(),
            date,
        });
    }
    out
}

pub struct FbrefScraper {
    client: &'static Client,
    cache: PageCache,
    base_url: String,
    delay: Duration,
}

impl FbrefScraper {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.scrape_timeout)?,
            cache: PageCache::open_default(),
            base_url: FBREF_BASE_URL.to_string(),
            delay: settings.scrape_delay,
        })
    }

    fn fetch(&self, url: &str) -> Result<String> {
        fetch_page_cached(self.client, &self.cache, url, PAGE_FRESH_FOR)
    }

    /// Scrapes seasons `start_year` down to `end_year`, newest first. A squad that
    /// fails is logged and left out; a standings page that fails ends the run.
    pub fn scrape(&self, start_year: i32, end_year: i32) -> Result<Vec<ScrapedMatch>> {
        let pruned = self.cache.prune(PAGE_RETAIN_FOR);
        if pruned > 0 {
            log::debug!("pruned {pruned} stale cached pages");
        }

        let mut all = Vec::new();
        let mut standings_url = format!("{}{}", self.base_url, PREMIER_LEAGUE_STATS_PATH);

        for season in (end_year..=start_year).rev() {
            log::info!("processing season {season}");
            let html = self
                .fetch(&standings_url)
                .with_context(|| format!("standings for season {season}"))?;
            let page = parse_standings(&html, &self.base_url)?;

            for team_url in &page.team_urls {
                match self.team_matches(team_url, season) {
                    Ok(rows) => {
                        log::info!(
                            "  {} rows for {}",
                            rows.len(),
                            team_name_from_url(team_url)
                        );
                        all.extend(rows);
                    }
                    Err(err) => log::warn!("skipping {team_url}: {err:#}"),
                }
                thread::sleep(self.delay);
            }

            let Some(prev) = page.prev_season_url else {
                if season > end_year {
                    log::warn!("no previous-season link after {season}; stopping");
                }
                break;
            };
            standings_url = prev;
        }

        Ok(all)
    }

    fn team_matches(&self, team_url: &str, season: i32) -> Result<Vec<ScrapedMatch>> {
        let team = team_name_from_url(team_url);
        let html = self.fetch(team_url)?;
        let fixtures = parse_match_log(&html, FIXTURES_CAPTION)?;

        let shooting_url = find_shooting_link(&html, &self.base_url)?
            .with_context(|| format!("no shooting link for {team}"))?;
        let shooting_html = self.fetch(&shooting_url)?;
        let shooting = parse_match_log(&shooting_html, SHOOTING_CAPTION)?;

        Ok(merge_team_logs(&fixtures, &shooting, &team, season))
    }
}

pub fn write_matches_csv(path: &Path, rows: &[ScrapedMatch]) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        wtr.serialize(row).context("write match row")?;
    }
    wtr.flush().context("flush match csv")?;
    Ok(())
}
