//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能：
//! - [`GeoOracle`]：统一的只读查询接口
//! - [`MaxMindOracle`]：MaxMind GeoIP2/GeoLite2 City 本地数据库
//! - [`StaticOracle`]：内存表实现（测试、基准）

mod location;
mod maxmind;
mod memory;
mod provider;

pub use location::GeoLocation;
pub use maxmind::{DatabaseMetadata, MaxMindOracle};
pub use memory::StaticOracle;
pub use provider::{GeoOracle, OracleError};
