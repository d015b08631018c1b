pub mod poloniex;
