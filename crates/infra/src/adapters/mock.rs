//! Offline catalog over the `world` sample database. Backs integration
//! tests and hosts that want completion without a live connection.

use async_trait::async_trait;

use naviql_app::ports::{CatalogError, CatalogProvider};
use naviql_domain::ColumnDesc;

pub struct MockCatalog;

impl MockCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogProvider for MockCatalog {
    async fn open(&self) -> Result<(), CatalogError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), CatalogError> {
        Ok(())
    }

    async fn databases(&self) -> Result<Vec<String>, CatalogError> {
        Ok(vec![
            "information_schema".to_string(),
            "mysql".to_string(),
            "performance_schema".to_string(),
            "sys".to_string(),
            "world".to_string(),
        ])
    }

    async fn tables(&self) -> Result<Vec<String>, CatalogError> {
        Ok(vec![
            "city".to_string(),
            "country".to_string(),
            "countrylanguage".to_string(),
        ])
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDesc>, CatalogError> {
        match table {
            "city" => Ok(city_columns()),
            "country" => Ok(country_columns()),
            "countrylanguage" => Ok(countrylanguage_columns()),
            other => Err(CatalogError::QueryFailed(format!("unknown table {other}"))),
        }
    }
}

fn col(
    name: &str,
    data_type: &str,
    nullable: bool,
    key: Option<&str>,
    default: Option<&str>,
    extra: Option<&str>,
) -> ColumnDesc {
    ColumnDesc {
        name: name.to_string(),
        data_type: data_type.to_string(),
        nullable,
        key: key.map(str::to_string),
        default: default.map(str::to_string),
        extra: extra.map(str::to_string),
    }
}

fn city_columns() -> Vec<ColumnDesc> {
    vec![
        col("ID", "int(11)", false, Some("PRI"), None, Some("auto_increment")),
        col("Name", "char(35)", false, None, None, None),
        col("CountryCode", "char(3)", false, Some("MUL"), None, None),
        col("District", "char(20)", false, None, None, None),
        col("Population", "int(11)", false, None, None, None),
    ]
}

fn country_columns() -> Vec<ColumnDesc> {
    vec![
        col("Code", "char(3)", false, Some("PRI"), None, None),
        col("Name", "char(52)", false, None, None, None),
        col("Continent", "enum('Asia','Europe','North America','Africa','Oceania','Antarctica','South America')", false, None, Some("Asia"), None),
        col("Region", "char(26)", false, None, None, None),
        col("SurfaceArea", "decimal(10,2)", false, None, Some("0.00"), None),
        col("IndepYear", "smallint(6)", true, None, None, None),
        col("Population", "int(11)", false, None, Some("0"), None),
        col("LifeExpectancy", "decimal(3,1)", true, None, None, None),
        col("GNP", "decimal(10,2)", true, None, None, None),
        col("GNPOld", "decimal(10,2)", true, None, None, None),
        col("LocalName", "char(45)", false, None, None, None),
        col("GovernmentForm", "char(45)", false, None, None, None),
        col("HeadOfState", "char(60)", true, None, None, None),
        col("Capital", "int(11)", true, None, None, None),
        col("Code2", "char(2)", false, None, None, None),
    ]
}

fn countrylanguage_columns() -> Vec<ColumnDesc> {
    vec![
        col("CountryCode", "char(3)", false, Some("PRI"), None, None),
        col("Language", "char(30)", false, Some("PRI"), None, None),
        col("IsOfficial", "enum('T','F')", false, None, Some("F"), None),
        col("Percentage", "decimal(4,1)", false, None, Some("0.0"), None),
    ]
}
