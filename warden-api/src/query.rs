use serde::{Deserialize, Serialize};

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: u64 = 15;
/// 每页条数上限
pub const MAX_PAGE_SIZE: u64 = 128;
/// 默认排序字段
pub const DEFAULT_ORDER_KEY: &str = "record_id";

/// 状态码（1=启用，-1=禁用）
/// 以有符号整数持久化，0 只在查询里表示"不过滤"，不能作为状态写入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Status {
    Enabled,
    Disabled,
}

impl Status {
    pub const ENABLED_CODE: i32 = 1;
    pub const DISABLED_CODE: i32 = -1;

    pub fn code(self) -> i32 {
        match self {
            Status::Enabled => Self::ENABLED_CODE,
            Status::Disabled => Self::DISABLED_CODE,
        }
    }

    /// 从存储值解析，只有 1 视为启用
    pub fn from_code(code: i32) -> Self {
        if code == Self::ENABLED_CODE {
            Status::Enabled
        } else {
            Status::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Status::Enabled)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Enabled
    }
}

/// 非法状态码
#[derive(Debug, thiserror::Error)]
#[error("invalid status code: {0}, expected 1 or -1")]
pub struct StatusCodeError(pub i32);

impl TryFrom<i32> for Status {
    type Error = StatusCodeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            Self::ENABLED_CODE => Ok(Status::Enabled),
            Self::DISABLED_CODE => Ok(Status::Disabled),
            other => Err(StatusCodeError(other)),
        }
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParam {
    /// 当前页（从1开始）
    pub current: u64,
    pub page_size: u64,
    /// 不分页，返回全部
    pub unpaged: bool,
}

impl PaginationParam {
    pub fn new(current: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            current: current.filter(|c| *c > 0).unwrap_or(1),
            page_size: page_size
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
            unpaged: false,
        }
    }

    pub fn unpaged() -> Self {
        Self {
            current: 1,
            page_size: 0,
            unpaged: true,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.current.max(1) - 1) * self.page_size
    }
}

impl Default for PaginationParam {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

/// 排序参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParam {
    pub key: String,
    pub direction: OrderDirection,
}

impl OrderParam {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: OrderDirection::Desc,
        }
    }
}

impl Default for OrderParam {
    fn default() -> Self {
        Self::desc(DEFAULT_ORDER_KEY)
    }
}

/// 分页信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub current: u64,
    pub page_size: u64,
}

/// 查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult<T> {
    pub list: Vec<T>,
    pub pagination: Pagination,
}

impl<T> QueryResult<T> {
    pub fn new(list: Vec<T>, pagination: Pagination) -> Self {
        Self { list, pagination }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> QueryResult<U> {
        QueryResult {
            list: self.list.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Enabled.code(), 1);
        assert_eq!(Status::Disabled.code(), -1);
        assert_eq!(Status::from_code(1), Status::Enabled);
        assert_eq!(Status::from_code(0), Status::Disabled);
        assert!(Status::try_from(0).is_err());
    }

    #[test]
    fn test_status_serde_as_integer() {
        let json = serde_json::to_string(&Status::Disabled).unwrap();
        assert_eq!(json, "-1");
        let status: Status = serde_json::from_str("1").unwrap();
        assert_eq!(status, Status::Enabled);
        assert!(serde_json::from_str::<Status>("0").is_err());
    }

    #[test]
    fn test_pagination_defaults_and_offset() {
        let page = PaginationParam::new(None, None);
        assert_eq!(page.current, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);

        let page = PaginationParam::new(Some(3), Some(10));
        assert_eq!(page.offset(), 20);

        let page = PaginationParam::new(Some(1), Some(1000));
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_default_order() {
        let order = OrderParam::default();
        assert_eq!(order.key, "record_id");
        assert_eq!(order.direction, OrderDirection::Desc);
    }
}
