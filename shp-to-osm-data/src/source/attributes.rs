//! dBase field values to attribute values.

use std::io::{Read, Seek};

use log::debug;
use shapefile::dbase::{FieldIOError, FieldIterator, FieldValue, ReadableRecord};
use shp_to_osm_core::{AttributeMap, AttributeValue};

/// dBase columns of one record, in field declaration order.
#[derive(Debug, Clone, Default)]
pub struct ColumnRecord {
    columns: Vec<(String, FieldValue)>,
}

impl ReadableRecord for ColumnRecord {
    fn read_using<Source, MemoSource>(
        field_iterator: &mut FieldIterator<Source, MemoSource>,
    ) -> Result<Self, FieldIOError>
    where
        Source: Read + Seek,
        MemoSource: Read + Seek,
    {
        let mut columns = Vec::new();
        for field in field_iterator {
            let named = field?;
            columns.push((named.name.to_owned(), named.value));
        }
        Ok(Self { columns })
    }
}

/// Attributes of `record`, keeping the table's column order.
pub(super) fn attribute_map(record: ColumnRecord) -> AttributeMap {
    record
        .columns
        .into_iter()
        .map(|(name, field)| {
            let value = attribute_value(&name, field);
            (name, value)
        })
        .collect()
}

fn attribute_value(name: &str, field: FieldValue) -> AttributeValue {
    match field {
        FieldValue::Character(text) => text.into(),
        FieldValue::Memo(text) => AttributeValue::Text(text),
        FieldValue::Numeric(number) => number.into(),
        FieldValue::Float(number) => number.map(f64::from).into(),
        FieldValue::Double(number) | FieldValue::Currency(number) => AttributeValue::Float(number),
        FieldValue::Integer(number) => AttributeValue::Integer(i64::from(number)),
        FieldValue::Logical(flag) => flag.map(|value| value.to_string()).into(),
        FieldValue::Date(date) => date
            .map(|day| format!("{:04}-{:02}-{:02}", day.year(), day.month(), day.day()))
            .into(),
        other => {
            debug!("Column {name}: unsupported field value {other:?} read as null");
            AttributeValue::Null
        }
    }
}
