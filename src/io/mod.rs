// Copyright 2020 @TwoCookingMice

pub mod csv_utils;
pub mod off_utils;
