pub mod comment;
pub mod task;

#[cfg(test)]
pub mod test_util;
