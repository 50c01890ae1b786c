//! Writes a synthetic league table CSV (20 clubs, double round robin,
//! three up / three down) for trying the dashboard without real data.
//!
//! Usage: `generate_sample [OUTPUT.csv]`

use anyhow::{Context, Result};

use league_dash::data::SeasonRow;

const FIRST_SEASON: i32 = 1993;
const LAST_SEASON: i32 = 2024;
const LEAGUE_SIZE: usize = 20;
const RELEGATED: usize = 3;

const CLUBS: [&str; 30] = [
    "Ashford Athletic", "Barrow Rovers", "Bridgeport City", "Carlton United",
    "Dunmore Town", "Eastfield", "Fairhaven", "Glenwood Wanderers",
    "Harbour Albion", "Ironbridge", "Kingsmead", "Lakeside Rangers",
    "Millbrook", "Northgate County", "Oakridge", "Portland Villa",
    "Queensbury", "Riverside", "Southwick Forest", "Thornbury",
    "Upton Park Rovers", "Valewood", "Westbury Athletic", "Yardley Town",
    "Ambleside", "Brookfield", "Castleton", "Dovercourt", "Elmstead", "Fenwick",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Knuth's method; fine for the small means of football scores.
    fn poisson(&mut self, mean: f64) -> u32 {
        let limit = (-mean).exp();
        let mut k = 0;
        let mut p = self.next_f64();
        while p > limit {
            k += 1;
            p *= self.next_f64();
        }
        k
    }
}

#[derive(Default, Clone)]
struct Record {
    won: u32,
    drawn: u32,
    lost: u32,
    gf: u32,
    ga: u32,
}

impl Record {
    fn points(&self) -> u32 {
        self.won * 3 + self.drawn
    }

    fn add(&mut self, scored: u32, conceded: u32) {
        self.gf += scored;
        self.ga += conceded;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => self.won += 1,
            std::cmp::Ordering::Equal => self.drawn += 1,
            std::cmp::Ordering::Less => self.lost += 1,
        }
    }
}

fn play_season(
    season: i32,
    league: &[usize],
    strength: &mut [f64],
    rng: &mut SimpleRng,
) -> Vec<SeasonRow> {
    for &club in league {
        strength[club] = (strength[club] + (rng.next_f64() - 0.5) * 0.3).clamp(0.4, 2.2);
    }

    let mut records = vec![Record::default(); league.len()];
    for home in 0..league.len() {
        for away in 0..league.len() {
            if home == away {
                continue;
            }
            let (sh, sa) = (strength[league[home]], strength[league[away]]);
            let home_goals = rng.poisson(1.45 * sh / sa.sqrt());
            let away_goals = rng.poisson(1.10 * sa / sh.sqrt());
            records[home].add(home_goals, away_goals);
            records[away].add(away_goals, home_goals);
        }
    }

    let mut order: Vec<usize> = (0..league.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&records[a], &records[b]);
        rb.points()
            .cmp(&ra.points())
            .then((rb.gf as i32 - rb.ga as i32).cmp(&(ra.gf as i32 - ra.ga as i32)))
            .then(rb.gf.cmp(&ra.gf))
    });

    order
        .iter()
        .enumerate()
        .map(|(pos, &i)| {
            let r = &records[i];
            SeasonRow {
                season_end_year: season,
                team: CLUBS[league[i]].to_string(),
                position: pos as u32 + 1,
                played: r.won + r.drawn + r.lost,
                won: r.won,
                drawn: r.drawn,
                lost: r.lost,
                gf: r.gf,
                ga: r.ga,
                gd: r.gf as i32 - r.ga as i32,
                points: r.points(),
            }
        })
        .collect()
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_league.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let mut strength: Vec<f64> = (0..CLUBS.len()).map(|_| 0.6 + rng.next_f64() * 1.2).collect();
    let mut league: Vec<usize> = (0..LEAGUE_SIZE).collect();
    let mut reserve: Vec<usize> = (LEAGUE_SIZE..CLUBS.len()).collect();

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut rows_written = 0usize;

    for season in FIRST_SEASON..=LAST_SEASON {
        let table = play_season(season, &league, &mut strength, &mut rng);
        for row in &table {
            writer.serialize(row).context("writing row")?;
            rows_written += 1;
        }

        // Bottom three go down; the three longest-waiting reserve clubs come up.
        let relegated: Vec<usize> = table[LEAGUE_SIZE - RELEGATED..]
            .iter()
            .filter_map(|r| CLUBS.iter().position(|c| *c == r.team))
            .collect();
        league.retain(|c| !relegated.contains(c));
        league.extend(reserve.drain(..RELEGATED));
        reserve.extend(relegated);
    }

    writer.flush().context("flushing CSV")?;
    println!(
        "Wrote {rows_written} rows ({} seasons) to {output_path}",
        LAST_SEASON - FIRST_SEASON + 1
    );
    Ok(())
}
