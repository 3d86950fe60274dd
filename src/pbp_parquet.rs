use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Row, RowAccessor};
use parquet::schema::types::Type;

use crate::http_client;
use crate::play::{PlayTable, RawPlay, SourceColumns};
use crate::season_loader::PlaySource;

pub const DEFAULT_URL_TEMPLATE: &str =
    "https://github.com/nflverse/nflverse-data/releases/download/pbp/play_by_play_{season}.parquet";

const DOWNLOAD_ATTEMPTS: u64 = 4;

const WANTED_COLUMNS: [&str; 14] = [
    "down",
    "ydstogo",
    "play_type",
    "posteam",
    "yardline_100",
    "first_down",
    "first_down_converted",
    "touchdown",
    "complete_pass",
    "pass_length",
    "receiver_player_id",
    "receiver_player_name",
    "rusher_player_id",
    "rusher_player_name",
];

pub fn season_file_name(season: u16) -> String {
    format!("play_by_play_{season}.parquet")
}

/// Downloads nflverse season files and decodes them.
#[derive(Debug, Clone)]
pub struct NflverseSource {
    pub url_template: String,
    pub cache_dir: PathBuf,
}

impl NflverseSource {
    pub fn season_url(&self, season: u16) -> String {
        self.url_template.replace("{season}", &season.to_string())
    }
}

impl PlaySource for NflverseSource {
    fn load_season(&self, season: u16) -> Result<PlayTable> {
        fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("create {}", self.cache_dir.display()))?;
        let url = self.season_url(season);
        let path = download_file(&url, &self.cache_dir.join(season_file_name(season)))?;
        decode_play_table(&path)
    }
}

/// Reads `play_by_play_<season>.parquet` files from a local directory.
#[derive(Debug, Clone)]
pub struct LocalParquetSource {
    pub dir: PathBuf,
}

impl PlaySource for LocalParquetSource {
    fn load_season(&self, season: u16) -> Result<PlayTable> {
        let path = self.dir.join(season_file_name(season));
        if !path.is_file() {
            return Err(anyhow!("{} not found", path.display()));
        }
        decode_play_table(&path)
    }
}

fn download_file(url: &str, path: &Path) -> Result<PathBuf> {
    let client = http_client::download_client()?;
    let mut last_err: Option<anyhow::Error> = None;
    for attempt in 1..=DOWNLOAD_ATTEMPTS {
        let fetched = client
            .get(url)
            .send()
            .with_context(|| format!("request {url}"))
            .and_then(|res| {
                res.error_for_status()
                    .with_context(|| format!("status for {url}"))
            })
            .and_then(|res| res.bytes().with_context(|| format!("read body {url}")));
        match fetched {
            Ok(bytes) => {
                let tmp = path.with_extension("parquet.tmp");
                fs::write(&tmp, &bytes).with_context(|| format!("write {}", tmp.display()))?;
                fs::rename(&tmp, path).with_context(|| format!("move {}", path.display()))?;
                return Ok(path.to_path_buf());
            }
            Err(err) => {
                // 404 means the season is not published yet; retrying won't help.
                let not_found = err
                    .downcast_ref::<reqwest::Error>()
                    .and_then(|e| e.status())
                    .is_some_and(|s| s == reqwest::StatusCode::NOT_FOUND);
                last_err = Some(err);
                if not_found {
                    break;
                }
                if attempt < DOWNLOAD_ATTEMPTS {
                    std::thread::sleep(Duration::from_millis(500 * attempt));
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("download failed for {url}")))
}

#[derive(Debug, Clone, Copy, Default)]
struct ColumnIndex {
    down: Option<usize>,
    ydstogo: Option<usize>,
    play_type: Option<usize>,
    posteam: Option<usize>,
    yardline_100: Option<usize>,
    first_down: Option<usize>,
    first_down_converted: Option<usize>,
    touchdown: Option<usize>,
    complete_pass: Option<usize>,
    pass_length: Option<usize>,
    receiver_player_id: Option<usize>,
    receiver_player_name: Option<usize>,
    rusher_player_id: Option<usize>,
    rusher_player_name: Option<usize>,
}

impl ColumnIndex {
    fn from_projection(names: &[&str]) -> Self {
        let at = |name: &str| names.iter().position(|n| *n == name);
        Self {
            down: at("down"),
            ydstogo: at("ydstogo"),
            play_type: at("play_type"),
            posteam: at("posteam"),
            yardline_100: at("yardline_100"),
            first_down: at("first_down"),
            first_down_converted: at("first_down_converted"),
            touchdown: at("touchdown"),
            complete_pass: at("complete_pass"),
            pass_length: at("pass_length"),
            receiver_player_id: at("receiver_player_id"),
            receiver_player_name: at("receiver_player_name"),
            rusher_player_id: at("rusher_player_id"),
            rusher_player_name: at("rusher_player_name"),
        }
    }

    fn source_columns(&self) -> SourceColumns {
        SourceColumns {
            touchdown: self.touchdown.is_some(),
            receiver_identity: self.receiver_player_id.is_some(),
            rusher_identity: self.rusher_player_id.is_some(),
        }
    }

    fn read(&self, row: &Row) -> RawPlay {
        RawPlay {
            down: read_num(row, self.down),
            ydstogo: read_num(row, self.ydstogo),
            play_type: read_text(row, self.play_type),
            posteam: read_text(row, self.posteam),
            yardline_100: read_num(row, self.yardline_100),
            first_down: read_flag(row, self.first_down),
            first_down_converted: read_flag(row, self.first_down_converted),
            touchdown: read_flag(row, self.touchdown),
            complete_pass: read_flag(row, self.complete_pass),
            pass_length: read_text(row, self.pass_length),
            receiver_player_id: read_text(row, self.receiver_player_id),
            receiver_player_name: read_text(row, self.receiver_player_name),
            rusher_player_id: read_text(row, self.rusher_player_id),
            rusher_player_name: read_text(row, self.rusher_player_name),
        }
    }
}

/// Decodes a play-by-play parquet file, reading only the columns the
/// calculators use and noting which optional ones were absent.
pub fn decode_play_table(path: &Path) -> Result<PlayTable> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(file).context("open parquet reader plays")?;

    let root = reader.metadata().file_metadata().schema_descr().root_schema();
    let mut fields = Vec::new();
    let mut names = Vec::new();
    for wanted in WANTED_COLUMNS {
        if let Some(field) = root.get_fields().iter().find(|f| f.name() == wanted) {
            fields.push(field.clone());
            names.push(wanted);
        }
    }
    for required in ["down", "play_type"] {
        if !names.contains(&required) {
            return Err(anyhow!("{} has no `{required}` column", path.display()));
        }
    }

    let projection = Type::group_type_builder(root.name())
        .with_fields(fields)
        .build()
        .context("build parquet projection")?;
    let index = ColumnIndex::from_projection(&names);
    let iter = reader
        .get_row_iter(Some(projection))
        .context("iterate play rows")?;

    let mut rows = Vec::new();
    let mut unreadable = 0usize;
    for row in iter {
        let Ok(row) = row else {
            unreadable += 1;
            continue;
        };
        rows.push(index.read(&row));
    }
    if unreadable > 0 {
        eprintln!(
            "[WARN] skipped {unreadable} unreadable rows in {}",
            path.display()
        );
    }

    Ok(PlayTable::from_raw_rows(rows, index.source_columns()))
}

fn read_num(row: &Row, idx: Option<usize>) -> Option<f64> {
    let idx = idx?;
    let value = if let Ok(v) = row.get_double(idx) {
        v
    } else if let Ok(v) = row.get_float(idx) {
        f64::from(v)
    } else if let Ok(v) = row.get_long(idx) {
        v as f64
    } else if let Ok(v) = row.get_int(idx) {
        f64::from(v)
    } else {
        return None;
    };
    if value.is_nan() { None } else { Some(value) }
}

fn read_flag(row: &Row, idx: Option<usize>) -> Option<bool> {
    if let Some(i) = idx
        && let Ok(v) = row.get_bool(i)
    {
        return Some(v);
    }
    read_num(row, idx).map(|v| v != 0.0)
}

fn read_text(row: &Row, idx: Option<usize>) -> Option<String> {
    row.get_string(idx?).ok().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parquet::data_type::{ByteArray, ByteArrayType, DoubleType};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;

    use super::*;
    use crate::play::PlayType;

    const FIXTURE_SCHEMA: &str = "
        message pbp {
            OPTIONAL DOUBLE down;
            OPTIONAL DOUBLE ydstogo;
            OPTIONAL BYTE_ARRAY play_type (UTF8);
            OPTIONAL BYTE_ARRAY posteam (UTF8);
            OPTIONAL DOUBLE first_down;
            OPTIONAL BYTE_ARRAY desc (UTF8);
        }
    ";

    fn text(values: &[&str]) -> Vec<ByteArray> {
        values.iter().map(|v| ByteArray::from(*v)).collect()
    }

    fn write_fixture(path: &Path) -> Result<()> {
        let schema = Arc::new(parse_message_type(FIXTURE_SCHEMA)?);
        let props = Arc::new(WriterProperties::builder().build());
        let file = fs::File::create(path)?;
        let mut writer = SerializedFileWriter::new(file, schema, props)?;
        let mut group = writer.next_row_group()?;

        let mut col = group.next_column()?.ok_or_else(|| anyhow!("down"))?;
        col.typed::<DoubleType>()
            .write_batch(&[3.0, 3.0, 1.0], Some(&[1, 1, 1, 0]), None)?;
        col.close()?;

        let mut col = group.next_column()?.ok_or_else(|| anyhow!("ydstogo"))?;
        col.typed::<DoubleType>()
            .write_batch(&[2.0, 10.0, 5.0], Some(&[1, 0, 1, 1]), None)?;
        col.close()?;

        let mut col = group.next_column()?.ok_or_else(|| anyhow!("play_type"))?;
        col.typed::<ByteArrayType>().write_batch(
            &text(&["pass", "run", "punt", "pass"]),
            Some(&[1, 1, 1, 1]),
            None,
        )?;
        col.close()?;

        let mut col = group.next_column()?.ok_or_else(|| anyhow!("posteam"))?;
        col.typed::<ByteArrayType>().write_batch(
            &text(&["KC", "KC", "KC"]),
            Some(&[1, 0, 1, 1]),
            None,
        )?;
        col.close()?;

        let mut col = group.next_column()?.ok_or_else(|| anyhow!("first_down"))?;
        col.typed::<DoubleType>()
            .write_batch(&[1.0, 0.0, 0.0, 0.0], Some(&[1, 1, 1, 1]), None)?;
        col.close()?;

        let mut col = group.next_column()?.ok_or_else(|| anyhow!("desc"))?;
        col.typed::<ByteArrayType>().write_batch(
            &text(&["a", "b", "c", "d"]),
            Some(&[1, 1, 1, 1]),
            None,
        )?;
        col.close()?;

        group.close()?;
        writer.close()?;
        Ok(())
    }

    fn fixture_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nfl_probability_{}_{name}", std::process::id()))
    }

    #[test]
    fn decodes_rows_and_notes_missing_columns() {
        let path = fixture_path("pbp.parquet");
        write_fixture(&path).expect("write fixture");

        let table = decode_play_table(&path).expect("decode fixture");
        let _ = fs::remove_file(&path);

        assert_eq!(table.len(), 2);
        assert!(!table.columns.touchdown);
        assert!(!table.columns.receiver_identity);
        assert!(!table.columns.rusher_identity);

        let first = &table.plays[0];
        assert_eq!(first.down, 3);
        assert_eq!(first.ydstogo, Some(2.0));
        assert_eq!(first.play_type, PlayType::Pass);
        assert_eq!(first.posteam.as_deref(), Some("KC"));
        assert!(first.first_down_converted);
        assert!(!first.touchdown);

        let second = &table.plays[1];
        assert_eq!(second.ydstogo, None);
        assert_eq!(second.posteam, None);
        assert!(!second.first_down_converted);
    }

    #[test]
    fn local_source_reports_missing_season_file() {
        let src = LocalParquetSource {
            dir: fixture_path("empty_dir"),
        };
        let err = src.load_season(1999).unwrap_err();
        assert!(err.to_string().contains("play_by_play_1999.parquet"));
    }

    #[test]
    fn season_url_fills_template() {
        let src = NflverseSource {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            cache_dir: PathBuf::from("/tmp"),
        };
        assert!(src.season_url(2024).ends_with("/pbp/play_by_play_2024.parquet"));
    }
}
