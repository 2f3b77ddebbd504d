//! Test helpers for composing convert CLI inputs and layered overrides.

use super::*;
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Writer};
use std::fs;
use tempfile::TempDir;

/// Rule file used by the CLI scenarios.
pub(super) const RULES: &str = "point,NAME,,name,-\npoint,KIND,stop,highway,bus_stop\n";

#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) rulesfile: Option<Utf8PathBuf>,
    pub(super) osmfile: Option<String>,
    pub(super) outdir: Option<Utf8PathBuf>,
}

#[derive(Debug)]
pub(super) struct InputFiles {
    _dir: TempDir,
    shapefile: Utf8PathBuf,
    rules: Utf8PathBuf,
    config_rules: Utf8PathBuf,
    outdir: Utf8PathBuf,
}

impl InputFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 tempdir");
        let shapefile = root.join("stops.shp");
        write_stops(&shapefile);
        let rules = root.join("cli.rules");
        let config_rules = root.join("config.rules");
        for path in [&rules, &config_rules] {
            fs::write(path, RULES).expect("write rule file");
        }
        let outdir = root.join("out");
        fs::create_dir(&outdir).expect("create output directory");
        Self {
            _dir: dir,
            shapefile,
            rules,
            config_rules,
            outdir,
        }
    }

    pub(super) fn shapefile(&self) -> &Utf8Path {
        &self.shapefile
    }

    pub(super) fn rules(&self) -> &Utf8Path {
        &self.rules
    }

    pub(super) fn config_rules(&self) -> &Utf8Path {
        &self.config_rules
    }

    pub(super) fn outdir(&self) -> &Utf8Path {
        &self.outdir
    }
}

/// Two bus stops, one of them named.
fn write_stops(path: &Utf8Path) {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("NAME").expect("field name"), 32)
        .add_character_field(FieldName::try_from("KIND").expect("field name"), 16);
    let mut writer = Writer::from_path(path.as_std_path(), table).expect("create shapefile");
    for (x, y, name) in [(4.9, 52.37, Some("Dam")), (4.91, 52.38, None)] {
        let mut record = Record::default();
        record.insert("NAME".to_owned(), FieldValue::Character(name.map(str::to_owned)));
        record.insert("KIND".to_owned(), FieldValue::Character(Some("stop".to_owned())));
        writer
            .write_shape_and_record(&Point::new(x, y), &record)
            .expect("write record");
    }
    drop(writer);
}

pub(super) fn merge_layers(
    mut cli_args: ConvertArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<ConvertConfig, CliError> {
    merge_field(
        &mut cli_args.rulesfile,
        extract_field(env_layer.as_ref(), |layer| &layer.rulesfile),
        extract_field(file_layer.as_ref(), |layer| &layer.rulesfile),
    );
    merge_field(
        &mut cli_args.osmfile,
        extract_field(env_layer.as_ref(), |layer| &layer.osmfile),
        extract_field(file_layer.as_ref(), |layer| &layer.osmfile),
    );
    merge_field(
        &mut cli_args.outdir,
        extract_field(env_layer.as_ref(), |layer| &layer.outdir),
        extract_field(file_layer.as_ref(), |layer| &layer.outdir),
    );
    resolve_convert_config(cli_args)
}

fn merge_field<T: Clone>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: Option<&LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.and_then(|entry| accessor(entry).clone())
}
