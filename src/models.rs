use serde::{Deserialize, Serialize};

/// 新建商品时固定使用的占位图
pub const CREATE_PLACEHOLDER_IMAGE: &str = "https://placeimg.com/640/480/any";

/// 商品分类（只保留界面用到的字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// 远端商品记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// 第一张图片（缩略图）
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// PUT /products/{id} 的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPatch {
    pub title: String,
    pub price: Option<i64>, // None 序列化为 null
}

impl ProductPatch {
    pub fn from_form(title: &str, price: &str) -> Self {
        Self {
            title: title.to_string(),
            price: parse_int_lenient(price),
        }
    }
}

/// POST /products 的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub price: Option<i64>,
    pub description: String,
    pub category_id: Option<i64>,
    pub images: Vec<String>,
}

impl NewProduct {
    pub fn from_form(title: &str, price: &str, description: &str, category_id: &str) -> Self {
        Self {
            title: title.to_string(),
            price: parse_int_lenient(price),
            description: description.to_string(),
            category_id: parse_int_lenient(category_id),
            images: vec![CREATE_PLACEHOLDER_IMAGE.to_string()],
        }
    }
}

/// 宽松整数解析：跳过前导空白，可选正负号，可选 `0x` 十六进制前缀，取最长的数字前缀。
///
/// "42abc" -> 42，"12.9" -> 12，"0x1A" -> 26，"abc" / "" / "0x" -> None。
/// 超出 i64 范围时饱和到 `i64::MAX` / `i64::MIN`。
pub fn parse_int_lenient(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, rest) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let digits: Vec<i64> = rest
        .chars()
        .map_while(|c| c.to_digit(radix))
        .map(i64::from)
        .collect();
    if digits.is_empty() {
        return None;
    }

    let radix = i64::from(radix);
    let value = digits.into_iter().fold(0i64, |acc, d| {
        let shifted = acc.saturating_mul(radix);
        if negative {
            shifted.saturating_sub(d)
        } else {
            shifted.saturating_add(d)
        }
    });
    Some(value)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_lenient() {
        assert_eq!(parse_int_lenient("42"), Some(42));
        assert_eq!(parse_int_lenient("  17 dollars"), Some(17));
        assert_eq!(parse_int_lenient("12.9"), Some(12));
        assert_eq!(parse_int_lenient("-5"), Some(-5));
        assert_eq!(parse_int_lenient("+8"), Some(8));
        assert_eq!(parse_int_lenient("abc"), None);
        assert_eq!(parse_int_lenient(""), None);
        assert_eq!(parse_int_lenient("-"), None);
    }

    #[test]
    fn test_parse_int_hex_prefix() {
        assert_eq!(parse_int_lenient("0x1A"), Some(26));
        assert_eq!(parse_int_lenient("  0Xff"), Some(255));
        assert_eq!(parse_int_lenient("-0x10"), Some(-16));
        assert_eq!(parse_int_lenient("0x1Gz"), Some(1));
        assert_eq!(parse_int_lenient("0x"), None);
        assert_eq!(parse_int_lenient("0xg"), None);
        assert_eq!(parse_int_lenient("0"), Some(0));
    }

    #[test]
    fn test_parse_int_saturates_out_of_range() {
        assert_eq!(parse_int_lenient("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_int_lenient("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_int_lenient("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_int_lenient("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_int_lenient("0xffffffffffffffffff"), Some(i64::MAX));
    }

    #[test]
    fn test_deserialize_api_product() {
        let raw = r#"{
            "id": 4,
            "title": "Handmade Fresh Table",
            "slug": "handmade-fresh-table",
            "price": 687,
            "description": "Andy shoes are designed",
            "category": {"id": 5, "name": "Others", "image": "https://placeimg.com/640/480/any"},
            "images": ["https://placeimg.com/640/480/any?r=0.9178516507833767"],
            "creationAt": "2023-01-03T15:58:58.000Z"
        }"#;

        let product: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(product.id, 4);
        assert_eq!(product.price, 687.0);
        assert_eq!(product.category.name, "Others");
        assert_eq!(
            product.thumbnail(),
            Some("https://placeimg.com/640/480/any?r=0.9178516507833767")
        );
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let raw = r#"{"id": 1, "title": "Bare", "price": 3.5, "category": {"name": "Misc"}}"#;
        let product: Product = serde_json::from_str(raw).unwrap();
        assert!(product.description.is_empty());
        assert!(product.images.is_empty());
        assert_eq!(product.thumbnail(), None);
    }

    #[test]
    fn test_new_product_payload() {
        let draft = NewProduct::from_form("Lamp", "30", "Desk lamp", "2");
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["title"], "Lamp");
        assert_eq!(json["price"], 30);
        assert_eq!(json["categoryId"], 2);
        assert_eq!(json["images"][0], CREATE_PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_non_numeric_price_sent_as_null() {
        let patch = ProductPatch::from_form("Chair", "cheap");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["title"], "Chair");
        assert!(json["price"].is_null());
    }
}
