//! INI rule files (the configparser layout used by the biomet screening).
//!
//! ```ini
//! [TA_1_1_1]
//! inputfilename = AirTC_Avg
//! variablename = TA_1_1_1
//! minmax = [-40, 50]
//! ```

use ini::Ini;
use tracing::debug;

use crate::error::{ConfigLoadError, Result};
use crate::schema::{RawSection, RawValue, SectionResult};

pub(crate) fn read_sections(text: &str) -> Result<Vec<SectionResult>> {
    let document = Ini::load_from_str(text).map_err(|error| ConfigLoadError::Ini {
        message: error.to_string(),
    })?;

    let mut sections = Vec::new();
    for (name, properties) in document.iter() {
        let Some(name) = name else {
            if properties.iter().next().is_some() {
                debug!("ignoring keys outside of a rule section");
            }
            continue;
        };
        let mut section = RawSection::new(name.trim());
        for (key, value) in properties.iter() {
            section.push(key.trim(), RawValue::Text(value.trim().to_string()));
        }
        sections.push(Ok(section));
    }
    Ok(sections)
}
