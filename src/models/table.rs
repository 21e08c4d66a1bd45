use serde::Serialize;

/// 货币名称列（必需）
pub const COL_CURRENCY: &str = "Moeda";
/// 汇率列
pub const COL_RATE: &str = "Cotação";
/// 日期列
pub const COL_DATE: &str = "Data";

/// 表格中的一行
///
/// 行的身份由它在表格中的位置决定，同名货币不会合并
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyRow {
    /// 货币名称，单元格为空时为 `None`
    #[serde(rename = "Moeda")]
    pub currency: Option<String>,
    #[serde(rename = "Cotação")]
    pub rate: String,
    #[serde(rename = "Data")]
    pub as_of_date: String,
}

impl CurrencyRow {
    pub fn new(currency: impl Into<String>) -> Self {
        let currency = currency.into();
        Self {
            currency: if currency.trim().is_empty() {
                None
            } else {
                Some(currency)
            },
            ..Default::default()
        }
    }

    /// 非空的货币名称
    pub fn currency(&self) -> Option<&str> {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// 写入一次成功查询的结果
    pub fn fill(&mut self, quote: &Quote) {
        self.rate = quote.rate.clone();
        self.as_of_date = quote.as_of_date.clone();
    }
}

/// 一次成功查询得到的汇率和日期
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub rate: String,
    pub as_of_date: String,
}

impl Quote {
    pub fn new(rate: impl Into<String>, as_of_date: impl Into<String>) -> Self {
        Self {
            rate: rate.into(),
            as_of_date: as_of_date.into(),
        }
    }
}

/// 货币表格，行顺序即输入文件顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<CurrencyRow>,
}

impl Table {
    pub fn new(rows: Vec<CurrencyRow>) -> Self {
        Self { rows }
    }

    /// 由货币名称列表构造表格，空字符串对应缺失的货币
    pub fn from_currencies<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(currencies.into_iter().map(CurrencyRow::new).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CurrencyRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [CurrencyRow] {
        &mut self.rows
    }

    pub fn get(&self, index: usize) -> Option<&CurrencyRow> {
        self.rows.get(index)
    }
}
