// Copyright @yucwang 2021

pub mod backend;
pub mod mesh;
pub mod shape_filter;
