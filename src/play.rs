use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayType {
    Pass,
    Run,
}

impl PlayType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pass" => Some(Self::Pass),
            "run" => Some(Self::Run),
            _ => None,
        }
    }
}

/// One row as the provider hands it over. Every attribute may be missing,
/// either because the cell is null or because the column is not in the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPlay {
    pub down: Option<f64>,
    pub ydstogo: Option<f64>,
    pub play_type: Option<String>,
    pub posteam: Option<String>,
    pub yardline_100: Option<f64>,
    pub first_down: Option<bool>,
    pub first_down_converted: Option<bool>,
    pub touchdown: Option<bool>,
    pub complete_pass: Option<bool>,
    pub pass_length: Option<String>,
    pub receiver_player_id: Option<String>,
    pub receiver_player_name: Option<String>,
    pub rusher_player_id: Option<String>,
    pub rusher_player_name: Option<String>,
}

/// A pass or run play on downs 1-4 with every indicator resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRecord {
    pub down: u8,
    pub ydstogo: Option<f64>,
    pub play_type: PlayType,
    pub posteam: Option<String>,
    pub yardline_100: Option<f64>,
    pub first_down_converted: bool,
    pub touchdown: bool,
    pub completed: bool,
    pub receiver_id: Option<String>,
    pub receiver_name: Option<String>,
    pub rusher_id: Option<String>,
    pub rusher_name: Option<String>,
}

impl PlayRecord {
    /// Returns `None` for anything that is not a pass/run play on a real down.
    pub fn from_raw(raw: RawPlay) -> Option<Self> {
        let play_type = raw.play_type.as_deref().and_then(PlayType::parse)?;
        let down = raw.down.and_then(parse_down)?;

        let touchdown = raw.touchdown.unwrap_or(false);
        let first_down_converted = raw
            .first_down_converted
            .unwrap_or(raw.first_down.unwrap_or(false) || touchdown);
        let completed = raw.complete_pass.unwrap_or(raw.pass_length.is_some());

        Some(Self {
            down,
            ydstogo: raw.ydstogo,
            play_type,
            posteam: non_empty(raw.posteam),
            yardline_100: raw.yardline_100,
            first_down_converted,
            touchdown,
            completed,
            receiver_id: non_empty(raw.receiver_player_id),
            receiver_name: non_empty(raw.receiver_player_name),
            rusher_id: non_empty(raw.rusher_player_id),
            rusher_name: non_empty(raw.rusher_player_name),
        })
    }

    pub fn is_third_down(&self) -> bool {
        self.down == 3
    }
}

/// Which optional columns the source schema actually carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceColumns {
    pub touchdown: bool,
    pub receiver_identity: bool,
    pub rusher_identity: bool,
}

impl SourceColumns {
    pub fn all() -> Self {
        Self {
            touchdown: true,
            receiver_identity: true,
            rusher_identity: true,
        }
    }
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self::all()
    }
}

/// The filtered, read-only play set every calculator consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayTable {
    pub plays: Vec<PlayRecord>,
    pub columns: SourceColumns,
}

impl PlayTable {
    pub fn from_raw_rows(rows: impl IntoIterator<Item = RawPlay>, columns: SourceColumns) -> Self {
        let plays = rows.into_iter().filter_map(PlayRecord::from_raw).collect();
        Self { plays, columns }
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }
}

fn parse_down(raw: f64) -> Option<u8> {
    if !raw.is_finite() || raw.fract() != 0.0 || !(1.0..=4.0).contains(&raw) {
        return None;
    }
    Some(raw as u8)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
