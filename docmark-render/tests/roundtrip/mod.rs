mod documents;
mod units;
