use std::cmp::Ordering;

/// 삽입 정렬. 정렬된 앞부분에 현재 원소가 들어갈 자리를 찾아 끼워 넣는다.
///
/// 뒤의 원소가 앞의 원소보다 엄격하게 작을 때만 이동하므로 같은 키의 상대 순서가 유지된다.
///
/// # Example
/// ```
/// use record_desk_rust::catalog::sort::insertion_sort_by;
///
/// let mut v = vec![(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd')];
/// insertion_sort_by(&mut v, |a, b| a.0.cmp(&b.0));
/// assert_eq!(v, vec![(1, 'b'), (2, 'd'), (3, 'a'), (3, 'c')]);
/// ```
pub fn insertion_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// 버블 정렬. 인접한 두 원소를 비교해 교환이 한 번도 없을 때까지 반복한다.
///
/// 앞의 원소가 엄격하게 클 때만 교환하므로 안정 정렬이다.
pub fn bubble_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering
{
    let mut unsorted = items.len();
    let mut changed = true;

    while changed && unsorted > 1 {
        changed = false;
        for i in 1..unsorted {
            if compare(&items[i - 1], &items[i]) == Ordering::Greater {
                items.swap(i - 1, i);
                changed = true;
            }
        }
        // 한 바퀴가 끝나면 가장 큰 원소는 제자리에 있다.
        unsorted -= 1;
    }
}
