//! Gridwire test utilities.
//!
//! Helpers for integration testing: employee fixture builders and the
//! seeded dataset shared by the grid tests.

use chrono::NaiveDate;
use serde_json::Value as JsonValue;

/// Create a test employee with default values.
pub fn test_employee(name: &str, position: &str) -> TestEmployee {
    TestEmployee {
        id: 0,
        name: name.to_string(),
        position: position.to_string(),
        office: "London".to_string(),
        age: 30,
        start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
        salary: 100_000.0,
    }
}

/// An employee fixture builder.
#[derive(Debug, Clone)]
pub struct TestEmployee {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub office: String,
    pub age: i32,
    pub start_date: NaiveDate,
    pub salary: f64,
}

impl TestEmployee {
    /// Set the ID.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Set the office.
    pub fn in_office(mut self, office: &str) -> Self {
        self.office = office.to_string();
        self
    }

    /// Set the age.
    pub fn aged(mut self, age: i32) -> Self {
        self.age = age;
        self
    }

    /// Set the start date.
    pub fn started(mut self, year: i32, month: u32, day: u32) -> Self {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.start_date = date;
        }
        self
    }

    /// Set the salary.
    pub fn earning(mut self, salary: f64) -> Self {
        self.salary = salary;
        self
    }

    /// Render as a JSON row the way a grid source returns it.
    pub fn as_json(&self) -> JsonValue {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "position": self.position,
            "office": self.office,
            "age": self.age,
            "start_date": self.start_date.format("%Y-%m-%d").to_string(),
            "salary": self.salary,
        })
    }
}

/// The seeded 15-row employee dataset.
///
/// Exactly three rows carry "Senior" in their position, and ages span
/// 21–66, so search, column-filter, and range-filter tests have known
/// expected counts.
pub fn employees() -> Vec<JsonValue> {
    let rows = vec![
        test_employee("Airi Satou", "Accountant")
            .with_id(1)
            .in_office("Tokyo")
            .aged(33)
            .started(2008, 11, 28)
            .earning(162_700.0),
        test_employee("Angelica Ramos", "Chief Executive Officer (CEO)")
            .with_id(2)
            .in_office("London")
            .aged(47)
            .started(2009, 10, 9)
            .earning(1_200_000.0),
        test_employee("Ashton Cox", "Junior Technical Author")
            .with_id(3)
            .in_office("San Francisco")
            .aged(66)
            .started(2009, 1, 12)
            .earning(86_000.0),
        test_employee("Bradley Greer", "Software Engineer")
            .with_id(4)
            .in_office("London")
            .aged(41)
            .started(2012, 10, 13)
            .earning(132_000.0),
        test_employee("Brenden Wagner", "Software Engineer")
            .with_id(5)
            .in_office("San Francisco")
            .aged(28)
            .started(2011, 6, 7)
            .earning(206_850.0),
        test_employee("Brielle Williamson", "Integration Specialist")
            .with_id(6)
            .in_office("New York")
            .aged(61)
            .started(2012, 12, 2)
            .earning(372_000.0),
        test_employee("Bruno Nash", "Software Engineer")
            .with_id(7)
            .in_office("London")
            .aged(38)
            .started(2011, 5, 3)
            .earning(163_500.0),
        test_employee("Caesar Vance", "Pre-Sales Support")
            .with_id(8)
            .in_office("New York")
            .aged(21)
            .started(2011, 12, 12)
            .earning(106_450.0),
        test_employee("Cara Stevens", "Sales Assistant")
            .with_id(9)
            .in_office("New York")
            .aged(46)
            .started(2011, 12, 6)
            .earning(145_600.0),
        test_employee("Cedric Kelly", "Senior JavaScript Developer")
            .with_id(10)
            .in_office("Edinburgh")
            .aged(22)
            .started(2012, 3, 29)
            .earning(433_060.0),
        test_employee("Charde Marshall", "Regional Director")
            .with_id(11)
            .in_office("San Francisco")
            .aged(36)
            .started(2008, 10, 16)
            .earning(470_600.0),
        test_employee("Colleen Hurst", "JavaScript Developer")
            .with_id(12)
            .in_office("San Francisco")
            .aged(39)
            .started(2009, 9, 15)
            .earning(205_500.0),
        test_employee("Dai Rios", "Personnel Lead")
            .with_id(13)
            .in_office("Edinburgh")
            .aged(35)
            .started(2012, 9, 26)
            .earning(217_500.0),
        test_employee("Garrett Winters", "Senior Accountant")
            .with_id(14)
            .in_office("Tokyo")
            .aged(63)
            .started(2011, 7, 25)
            .earning(170_750.0),
        test_employee("Haley Kennedy", "Senior Marketing Designer")
            .with_id(15)
            .in_office("London")
            .aged(43)
            .started(2012, 12, 18)
            .earning(313_500.0),
    ];

    rows.iter().map(TestEmployee::as_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_has_fifteen_rows() {
        assert_eq!(employees().len(), 15);
    }

    #[test]
    fn dataset_has_three_seniors() {
        let seniors = employees()
            .iter()
            .filter(|e| {
                e["position"]
                    .as_str()
                    .is_some_and(|p| p.contains("Senior"))
            })
            .count();
        assert_eq!(seniors, 3);
    }

    #[test]
    fn builder_renders_iso_dates() {
        let row = test_employee("Test", "Tester").started(2011, 4, 25).as_json();
        assert_eq!(row["start_date"], "2011-04-25");
    }
}
