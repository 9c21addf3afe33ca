// 胶片目录库
//
// 本库提供胶片目录浏览的核心功能，包括：
// - 远端目录与本地收藏的列表同步引擎
// - 收藏存储与缓存保留策略
// - 远端目录客户端与连通性监视
// - 列表控制器与本地认证
// - API 路由

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod api;
pub mod database;
pub mod external;
pub mod models;
pub mod services;
