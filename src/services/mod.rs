pub mod cashin_pipeline;
