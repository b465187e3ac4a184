use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::enrich_config::TableSchema;
use crate::error::{EnrichError, Result};
use crate::neighborhood::{Neighborhood, Neighborhoods};

/// Loads the wide population table: neighborhood names across row 0, one
/// attribute per following row as laid out by `schema`.
pub fn read_population_table(path: &Path, schema: &TableSchema) -> Result<Neighborhoods> {
    let file = File::open(path).map_err(|e| EnrichError::io(path, e))?;
    let neighborhoods = parse_population_table(file, schema)?;
    info!(
        path = %path.display(),
        neighborhoods = neighborhoods.len(),
        "loaded population table"
    );
    Ok(neighborhoods)
}

pub fn parse_population_table<R: Read>(input: R, schema: &TableSchema) -> Result<Neighborhoods> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(schema.delimiter_byte()?)
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut rows: Vec<StringRecord> = Vec::new();
    for result in reader.records() {
        rows.push(result?);
    }

    let expected_rows = schema.rows.len() + 1;
    if rows.len() < expected_rows {
        return Err(EnrichError::Table(format!(
            "expected at least {} rows (header + {} attributes), found {}",
            expected_rows,
            schema.rows.len(),
            rows.len()
        )));
    }

    let header = &rows[0];
    let first = schema.first_neighborhood_column;
    if header.len() <= first {
        return Err(EnrichError::Table(format!(
            "header has {} columns, neighborhoods start at column {}",
            header.len(),
            first
        )));
    }

    for (offset, schema_row) in schema.rows.iter().enumerate() {
        let row_index = offset + 1;
        let row = &rows[row_index];
        if row.len() < header.len() {
            return Err(EnrichError::Table(format!(
                "row {} ({}) has {} columns, header has {}",
                row_index,
                schema_row.field.name(),
                row.len(),
                header.len()
            )));
        }
        if let Some(label) = &schema_row.label {
            let found = row.get(schema.label_column).unwrap_or("").trim();
            if found != label.trim() {
                return Err(EnrichError::Table(format!(
                    "row {} should be {:?} ({}), found {:?}",
                    row_index,
                    label,
                    schema_row.field.name(),
                    found
                )));
            }
        }
    }

    let mut neighborhoods = Neighborhoods::new();
    for (column, name) in header.iter().enumerate().skip(first) {
        let mut neighborhood = Neighborhood::new(name);
        for (offset, schema_row) in schema.rows.iter().enumerate() {
            let cell = &rows[offset + 1][column];
            let value: f64 = cell.trim().parse().map_err(|_| EnrichError::ParseValue {
                field: schema_row.field.name(),
                neighborhood: name.to_string(),
                value: cell.to_string(),
            })?;
            neighborhood.set(schema_row.field, value);
        }
        debug!(neighborhood = %name, population = neighborhood.population, "parsed column");
        neighborhoods.insert(neighborhood)?;
    }

    Ok(neighborhoods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich_config::SchemaRow;
    use crate::neighborhood::Attribute;

    /// Builds a table in the published layout with the given columns of
    /// (name, population); every other attribute is `i + 1` for row `i`.
    fn table(columns: &[(&str, &str)]) -> String {
        let mut out = String::from("Indicateur,Source,Année");
        for (name, _) in columns {
            out.push(',');
            out.push_str(name);
        }
        out.push('\n');
        for (i, attribute) in Attribute::ALL.iter().enumerate() {
            out.push_str(&format!("{},Recensement,2016", attribute.name()));
            for (_, population) in columns {
                out.push(',');
                if i == 0 {
                    out.push_str(population);
                } else {
                    out.push_str(&(i + 1).to_string());
                }
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_parse_published_layout() {
        let csv = table(&[("Ahuntsic-Cartierville", "134245"), ("Côte-Saint-Luc", " 32448.5 ")]);
        let hoods = parse_population_table(csv.as_bytes(), &TableSchema::default()).unwrap();

        assert_eq!(hoods.len(), 2);
        let names: Vec<&str> = hoods.as_slice().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Ahuntsic-Cartierville", "Côte-Saint-Luc"]);

        let csl = hoods.get("Côte-Saint-Luc").unwrap();
        assert_eq!(csl.population, 32448.5);
        assert_eq!(csl.density, 2.0);
        assert_eq!(csl.gini_index, 14.0);
        assert_eq!(csl.total_crime, 0);
        assert_eq!(csl.crime_rate, 0.0);
    }

    #[test]
    fn test_schema_reorders_rows() {
        let csv = table(&[("Verdun", "69229")]);
        let mut schema = TableSchema::default();
        schema.rows.swap(0, 1);
        let hoods = parse_population_table(csv.as_bytes(), &schema).unwrap();
        let verdun = hoods.get("Verdun").unwrap();
        assert_eq!(verdun.density, 69229.0);
        assert_eq!(verdun.population, 2.0);
    }

    #[test]
    fn test_label_guards_alignment() {
        let csv = table(&[("Verdun", "69229")]);
        let mut schema = TableSchema::default();
        schema.rows[0] = SchemaRow {
            field: Attribute::Population,
            label: Some("population".into()),
        };
        assert!(parse_population_table(csv.as_bytes(), &schema).is_ok());

        schema.rows[1].label = Some("population".into());
        let err = parse_population_table(csv.as_bytes(), &schema).unwrap_err();
        assert!(matches!(err, EnrichError::Table(_)));
    }

    #[test]
    fn test_too_few_rows() {
        let csv = table(&[("Verdun", "69229")]);
        let truncated: String = csv.lines().take(10).collect::<Vec<_>>().join("\n");
        let err = parse_population_table(truncated.as_bytes(), &TableSchema::default()).unwrap_err();
        assert!(err.to_string().contains("at least 15 rows"));
    }

    #[test]
    fn test_short_row() {
        let mut csv = table(&[("Verdun", "69229"), ("Lachine", "44489")]);
        csv = csv.replacen(",69229,44489", ",69229", 1);
        let err = parse_population_table(csv.as_bytes(), &TableSchema::default()).unwrap_err();
        assert!(matches!(err, EnrichError::Table(_)));
    }

    #[test]
    fn test_no_neighborhood_columns() {
        let csv = "a,b,c\n".repeat(15);
        let err = parse_population_table(csv.as_bytes(), &TableSchema::default()).unwrap_err();
        assert!(matches!(err, EnrichError::Table(_)));
    }

    #[test]
    fn test_non_numeric_cell() {
        let csv = table(&[("Verdun", "n/d")]);
        let err = parse_population_table(csv.as_bytes(), &TableSchema::default()).unwrap_err();
        match err {
            EnrichError::ParseValue {
                field,
                neighborhood,
                value,
            } => {
                assert_eq!(field, "population");
                assert_eq!(neighborhood, "Verdun");
                assert_eq!(value, "n/d");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_duplicate_column() {
        let csv = table(&[("Verdun", "69229"), ("Verdun", "1")]);
        let err = parse_population_table(csv.as_bytes(), &TableSchema::default()).unwrap_err();
        assert!(matches!(err, EnrichError::DuplicateNeighborhood(_)));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = table(&[("Anjou", "42796")]).replace(',', ";");
        let mut schema = TableSchema::default();
        schema.delimiter = ';';
        let hoods = parse_population_table(csv.as_bytes(), &schema).unwrap();
        assert_eq!(hoods.get("Anjou").unwrap().population, 42796.0);
    }

    #[test]
    fn test_leading_byte_order_mark() {
        let csv = format!("\u{feff}{}", table(&[("Ahuntsic-Cartierville", "134245")]));
        let mut schema = TableSchema::default();
        schema.rows[0].label = Some("population".into());
        let hoods = parse_population_table(csv.as_bytes(), &schema).unwrap();

        let names: Vec<&str> = hoods.as_slice().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Ahuntsic-Cartierville"]);
        assert_eq!(hoods.get("Ahuntsic-Cartierville").unwrap().population, 134245.0);
    }

    #[test]
    fn test_missing_file() {
        let err = read_population_table(Path::new("/nonexistent/table.csv"), &TableSchema::default())
            .unwrap_err();
        assert!(matches!(err, EnrichError::Io { .. }));
    }
}
