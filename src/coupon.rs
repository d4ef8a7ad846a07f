use chrono::NaiveDate;
use reqwest::Url;
use serde::Serialize;

use crate::constants::{QR_API_URL, QR_SIZE};
use crate::data_types::canteen_data_types::{Employee, MenuItem};
use crate::errors::CouponError;

/// What the QR code on a meal coupon encodes
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Coupon {
    pub name: String,
    pub email: String,
    pub date: NaiveDate,
    pub items: Vec<String>,
}

impl Coupon {
    pub fn new(employee: &Employee, date: NaiveDate, items: &[MenuItem]) -> Self {
        Coupon {
            name: employee.name.clone(),
            email: employee.email.clone(),
            date,
            items: items.iter().map(|i| i.name.clone()).collect(),
        }
    }

    pub fn qr_url(&self) -> Result<Url, CouponError> {
        let payload = serde_json::to_string(self)?;

        let mut url = Url::parse(QR_API_URL).map_err(|e| CouponError::Url(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("size", QR_SIZE)
            .append_pair("data", &payload);

        Ok(url)
    }

    /// PNG bytes of the QR code
    pub async fn fetch_qr(&self) -> Result<Vec<u8>, CouponError> {
        let url = self.qr_url()?;
        log::debug!("Fetching coupon QR for {}", self.email);

        let bytes = reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::canteen_data_types::Category;
    use rust_decimal::Decimal;

    fn coupon() -> Coupon {
        let employee = Employee {
            name: "Jane Doe".to_string(),
            email: "jane.doe@gmail.com".to_string(),
            phone_number: "555-123-4567".to_string(),
        };
        let items = vec![MenuItem {
            id: 1,
            name: "Veggie Burger".to_string(),
            description: String::new(),
            price: Decimal::new(800, 2),
            category: Category::Lunch,
        }];

        Coupon::new(&employee, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(), &items)
    }

    #[test]
    fn test_payload_fields() {
        let json: serde_json::Value = serde_json::to_value(coupon()).unwrap();
        assert_eq!(json["name"], "Jane Doe");
        assert_eq!(json["email"], "jane.doe@gmail.com");
        assert_eq!(json["date"], "2025-03-11");
        assert_eq!(json["items"][0], "Veggie Burger");
    }

    #[test]
    fn test_qr_url_encodes_payload() {
        let url = coupon().qr_url().unwrap();
        assert_eq!(url.host_str(), Some("api.qrserver.com"));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("size".to_string(), "200x200".to_string()));
        assert_eq!(pairs[1].0, "data");

        let decoded: serde_json::Value = serde_json::from_str(&pairs[1].1).unwrap();
        assert_eq!(decoded["items"], serde_json::json!(["Veggie Burger"]));
        assert!(!url.as_str().contains(' '));
    }
}
