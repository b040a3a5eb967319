/// Arithmetic mean over an iterator, `None` when the iterator is empty.
pub trait Mean<T> {
    fn mean(self) -> Option<T>;
}

macro_rules! float_mean {
    ($($num:ty)*) => ($(
        impl<I> Mean<$num> for I
        where
            I: Iterator<Item = $num>
        {
            fn mean(self) -> Option<$num> {
                let (sum, count) = self.fold((0.0, 0usize), |(sum, count), next| {
                    (sum + next, count + 1)
                });
                (count > 0).then(|| sum / count as $num)
            }
        }
    )*)
}

float_mean! { f32 f64 }
