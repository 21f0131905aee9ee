pub mod booking;
pub mod documents;
pub mod earnings;
pub mod matching;
pub mod offers;
pub mod pricing;
pub mod storage;
