pub(crate) mod neighbourhood;
pub(crate) mod search;

pub(crate) use neighbourhood::RouteSet;
pub(crate) use search::improve;
